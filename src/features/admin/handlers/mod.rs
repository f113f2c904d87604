pub mod admin_handlers;

pub use admin_handlers::{
    __path_create_user, __path_get_user, __path_list_users, create_user, get_user, list_users,
};
