use axum::extract::{Query, State};
use axum::Json;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{GeocodingQuery, GeocodingResultDto};
use crate::features::reports::handlers::ReportsState;
use crate::shared::types::ApiResponse;

/// Search addresses
///
/// Forward-geocoding proxy for the report form; results come from
/// Nominatim, capped at five candidates.
#[utoipa::path(
    get,
    path = "/api/geocoding/search",
    tag = "geocoding",
    params(GeocodingQuery),
    responses(
        (status = 200, description = "Address candidates", body = ApiResponse<Vec<GeocodingResultDto>>),
        (status = 400, description = "Missing query"),
        (status = 401, description = "Authentication required"),
        (status = 502, description = "Geocoder unreachable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_addresses(
    _user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Query(query): Query<GeocodingQuery>,
) -> Result<Json<ApiResponse<Vec<GeocodingResultDto>>>> {
    let results = state.geocoding.search(&query.q).await?;
    Ok(Json(ApiResponse::success(Some(results), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use axum_test::TestServer;

    use crate::shared::test_helpers::{citizen_user, offline_reports_state, with_auth};

    fn geocoding_router() -> Router {
        Router::new()
            .route("/api/geocoding/search", get(search_addresses))
            .with_state(offline_reports_state())
    }

    #[tokio::test]
    async fn search_requires_authentication() {
        let server = TestServer::new(geocoding_router()).unwrap();

        let response = server.get("/api/geocoding/search?q=via+roma").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn search_rejects_blank_query() {
        let server = TestServer::new(with_auth(geocoding_router(), citizen_user())).unwrap();

        let response = server.get("/api/geocoding/search?q=%20%20").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
