pub mod notification_handler;

pub use notification_handler::{
    __path_list_notifications, __path_mark_all_notifications_read, __path_mark_notification_read,
    __path_unread_count, list_notifications, mark_all_notifications_read, mark_notification_read,
    unread_count,
};
