use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginRequestDto, SessionResponseDto, SessionUserDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::SessionService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

/// Open a session with email and password
#[utoipa::path(
    post,
    path = "/api/session",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Session opened successfully", body = ApiResponse<SessionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Platform access disabled for the maintainer's company")
    ),
    tag = "session"
)]
pub async fn login(
    State(service): State<Arc<SessionService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<SessionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(session), None, None)))
}

/// Get the identity bound to the current session
#[utoipa::path(
    get,
    path = "/api/session/current",
    responses(
        (status = 200, description = "Current session retrieved successfully", body = ApiResponse<SessionUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "session",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn current_session(user: AuthenticatedUser) -> Result<Json<ApiResponse<SessionUserDto>>> {
    Ok(Json(ApiResponse::success(
        Some(SessionUserDto::from(user)),
        None,
        None,
    )))
}

/// Close the current session
///
/// Tokens are stateless, so closing a session is a client-side discard. The
/// endpoint still requires a valid token so stale clients get a 401.
#[utoipa::path(
    delete,
    path = "/api/session",
    responses(
        (status = 200, description = "Session closed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "session",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(_user: AuthenticatedUser) -> Result<Json<ApiResponse<()>>> {
    Ok(Json(ApiResponse::success(
        None,
        Some("Session closed".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{citizen_user, lazy_pool, test_token_service, with_auth};
    use axum::routing::{delete, get, post};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    fn login_router() -> Router {
        let pool = lazy_pool();
        let users = Arc::new(UserService::new(pool.clone()));
        let service = Arc::new(SessionService::new(pool, users, test_token_service()));
        Router::new()
            .route("/api/session", post(login))
            .with_state(service)
    }

    #[tokio::test]
    async fn login_rejects_malformed_email() {
        let server = TestServer::new(login_router()).unwrap();

        let response = server
            .post("/api/session")
            .json(&json!({"email": "not-an-email", "password": "secret123"}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn login_rejects_empty_password() {
        let server = TestServer::new(login_router()).unwrap();

        let response = server
            .post("/api/session")
            .json(&json!({"email": "mario.rossi@example.com", "password": ""}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn current_session_requires_auth() {
        let router = Router::new().route("/api/session/current", get(current_session));
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/session/current").await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn current_session_returns_identity() {
        let router = Router::new().route("/api/session/current", get(current_session));
        let server = TestServer::new(with_auth(router, citizen_user())).unwrap();

        let response = server.get("/api/session/current").await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("citizen@example.org"));
        assert!(body.contains("citizen"));
    }

    #[tokio::test]
    async fn logout_requires_auth() {
        let router = Router::new().route("/api/session", delete(logout));
        let server = TestServer::new(router).unwrap();

        let response = server.delete("/api/session").await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn logout_confirms_session_closed() {
        let router = Router::new().route("/api/session", delete(logout));
        let server = TestServer::new(with_auth(router, citizen_user())).unwrap();

        let response = server.delete("/api/session").await;

        response.assert_status_ok();
        assert!(response.text().contains("Session closed"));
    }
}
