use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::CreateStaffUserDto;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdministrator;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Provision a municipal staff or external maintainer account
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateStaffUserDto,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Administrator access required"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid role combination or company link")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateStaffUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create_user(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user.into()), None, None)),
    ))
}

/// List all accounts
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Administrator access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<AdminService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = service
        .list_users(pagination.offset(), pagination.limit())
        .await?;

    let data = users.into_iter().map(UserResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Get one account
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get_user(id).await?;
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::companies::services::CompanyService;
    use crate::features::users::services::UserService;
    use crate::shared::test_helpers::{administrator_user, citizen_user, lazy_pool, with_auth};
    use axum::routing::{get, post};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    fn admin_router() -> Router {
        let service = Arc::new(AdminService::new(
            Arc::new(UserService::new(lazy_pool())),
            Arc::new(CompanyService::new(lazy_pool())),
        ));
        Router::new()
            .route("/api/admin/users", post(create_user))
            .route("/api/admin/users/{id}", get(get_user))
            .with_state(service)
    }

    fn staff_payload(roles: serde_json::Value) -> serde_json::Value {
        json!({
            "email": "staff@comune.example.org",
            "password": "sufficiently-long",
            "first_name": "Paola",
            "last_name": "Bianchi",
            "roles": roles,
        })
    }

    #[tokio::test]
    async fn create_requires_administrator() {
        let server = TestServer::new(with_auth(admin_router(), citizen_user())).unwrap();

        let response = server
            .post("/api/admin/users")
            .json(&staff_payload(json!(["public_relations"])))
            .await;

        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let server = TestServer::new(admin_router()).unwrap();

        let response = server
            .post("/api/admin/users")
            .json(&staff_payload(json!(["public_relations"])))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn create_rejects_empty_roles() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/users")
            .json(&staff_payload(json!([])))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_rejects_citizen_role() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/users")
            .json(&staff_payload(json!(["citizen"])))
            .await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn create_rejects_maintainer_without_company() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/users")
            .json(&staff_payload(json!(["external_maintainer"])))
            .await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn create_rejects_maintainer_with_extra_roles() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let mut payload = staff_payload(json!(["external_maintainer", "infrastructures"]));
        payload["external_company_id"] = json!(Uuid::now_v7());

        let response = server.post("/api/admin/users").json(&payload).await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn create_rejects_company_link_on_staff_role() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let mut payload = staff_payload(json!(["road_maintenance"]));
        payload["external_company_id"] = json!(Uuid::now_v7());

        let response = server.post("/api/admin/users").json(&payload).await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn detail_rejects_malformed_id() {
        let server = TestServer::new(with_auth(admin_router(), administrator_user())).unwrap();

        let response = server.get("/api/admin/users/not-a-uuid").await;

        response.assert_status_bad_request();
    }
}
