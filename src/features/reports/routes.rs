use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportsState};
use crate::shared::constants::{MAX_PHOTO_SIZE_BYTES, MAX_REPORT_PHOTOS};

/// Routes for filing, listing and working reports, plus the geocoding
/// proxy. All of them sit behind the auth middleware; per-role checks live
/// in the handler guards and services.
pub fn protected_routes(state: ReportsState) -> Router {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_shared_reports)
                .post(handlers::create_report)
                .layer(DefaultBodyLimit::max(
                    MAX_REPORT_PHOTOS * MAX_PHOTO_SIZE_BYTES + 1024 * 1024,
                )),
        )
        .route("/api/reports/mine", get(handlers::list_my_reports))
        .route("/api/reports/pending", get(handlers::list_pending_reports))
        .route("/api/reports/assigned", get(handlers::list_assigned_reports))
        .route("/api/reports/external", get(handlers::list_external_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/reports/{id}/approve", post(handlers::approve_report))
        .route("/api/reports/{id}/reject", post(handlers::reject_report))
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route(
            "/api/reports/{id}/assign-external",
            post(handlers::assign_external),
        )
        .route(
            "/api/reports/{id}/assignable-technicals",
            get(handlers::list_assignable_technicals),
        )
        .route(
            "/api/reports/{id}/assignable-externals",
            get(handlers::list_assignable_externals),
        )
        .route(
            "/api/reports/{id}/messages",
            get(handlers::list_report_messages).post(handlers::create_report_message),
        )
        .route(
            "/api/reports/{id}/internal-notes",
            get(handlers::list_report_notes).post(handlers::create_report_note),
        )
        .route("/api/geocoding/search", get(handlers::search_addresses))
        .with_state(state)
}
