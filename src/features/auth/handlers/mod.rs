pub mod session_handler;

pub use session_handler::{
    __path_current_session, __path_login, __path_logout, current_session, login, logout,
};
