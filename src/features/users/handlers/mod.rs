pub mod user_handler;

pub use user_handler::{__path_signup, signup};
