pub mod password;
pub mod session_service;
pub mod token_service;

pub use password::{hash_password, verify_password};
pub use session_service::SessionService;
pub use token_service::{IssuedToken, TokenService};
