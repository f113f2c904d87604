use crate::features::companies::handlers;
use crate::features::companies::services::CompanyService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Company registry routes, administrator only (require a bearer token)
pub fn protected_routes(service: Arc<CompanyService>) -> Router {
    Router::new()
        .route(
            "/api/admin/external-companies",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route(
            "/api/admin/external-companies/{id}",
            get(handlers::get_company).patch(handlers::update_platform_access),
        )
        .with_state(service)
}
