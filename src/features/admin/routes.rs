use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Account management routes, administrator only (require a bearer token)
pub fn protected_routes(service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/api/admin/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/admin/users/{id}", get(handlers::get_user))
        .with_state(service)
}
