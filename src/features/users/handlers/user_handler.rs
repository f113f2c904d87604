use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::users::dtos::{SignupRequestDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// Register a citizen account
///
/// Public endpoint: anyone may sign up as a citizen. Staff accounts are
/// created through the admin surface instead.
#[utoipa::path(
    post,
    path = "/api/citizen/signup",
    request_body = SignupRequestDto,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "session"
)]
pub async fn signup(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<SignupRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.signup_citizen(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user.into()),
            Some("Account created".to_string()),
            None,
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::shared::test_helpers::lazy_pool;

    fn signup_router() -> Router {
        Router::new()
            .route("/api/citizen/signup", post(signup))
            .with_state(Arc::new(UserService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn signup_rejects_malformed_email() {
        let server = TestServer::new(signup_router()).unwrap();
        let response = server
            .post("/api/citizen/signup")
            .json(&json!({
                "email": "not-an-email",
                "password": "s3cret-password",
                "first_name": "Carla",
                "last_name": "Verdi"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let server = TestServer::new(signup_router()).unwrap();
        let response = server
            .post("/api/citizen/signup")
            .json(&json!({
                "email": "carla@example.org",
                "password": "short",
                "first_name": "Carla",
                "last_name": "Verdi"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_rejects_numeric_name() {
        let server = TestServer::new(signup_router()).unwrap();
        let response = server
            .post("/api/citizen/signup")
            .json(&json!({
                "email": "carla@example.org",
                "password": "s3cret-password",
                "first_name": "12345",
                "last_name": "Verdi"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
