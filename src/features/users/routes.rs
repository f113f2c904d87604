use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::users::handlers::user_handler;
use crate::features::users::services::UserService;

/// Create routes for citizen self-registration
///
/// Note: public (no authentication) - staff accounts go through /api/admin.
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/citizen/signup", post(user_handler::signup))
        .with_state(service)
}
