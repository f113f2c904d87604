use crate::features::auth::handlers;
use crate::features::auth::services::SessionService;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Public session routes (no authentication required)
pub fn public_routes(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/session", post(handlers::login))
        .with_state(service)
}

/// Protected session routes (require a bearer token)
pub fn protected_routes() -> Router {
    Router::new()
        .route("/api/session/current", get(handlers::current_session))
        .route("/api/session", delete(handlers::logout))
}
