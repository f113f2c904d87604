pub mod telegram_handler;

pub use telegram_handler::{
    __path_chat_reports, __path_check_linked, __path_create_link_token, __path_link_chat,
    chat_reports, check_linked, create_link_token, link_chat,
};
