use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdministrator;
use crate::features::companies::dtos::{
    CreateExternalCompanyDto, ExternalCompanyResponseDto, UpdatePlatformAccessDto,
};
use crate::features::companies::services::CompanyService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Register an external maintenance company
#[utoipa::path(
    post,
    path = "/api/admin/external-companies",
    request_body = CreateExternalCompanyDto,
    responses(
        (status = 201, description = "Company registered successfully", body = ApiResponse<ExternalCompanyResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Administrator access required"),
        (status = 409, description = "Company name already registered"),
        (status = 422, description = "Too many competence categories")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<CompanyService>>,
    AppJson(dto): AppJson<CreateExternalCompanyDto>,
) -> Result<(StatusCode, Json<ApiResponse<ExternalCompanyResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let company = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(company.into()), None, None)),
    ))
}

/// List registered external companies
#[utoipa::path(
    get,
    path = "/api/admin/external-companies",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Companies retrieved successfully", body = ApiResponse<Vec<ExternalCompanyResponseDto>>),
        (status = 403, description = "Administrator access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_companies(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<CompanyService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ExternalCompanyResponseDto>>>> {
    let (companies, total) = service
        .list(pagination.offset(), pagination.limit())
        .await?;

    let data = companies
        .into_iter()
        .map(ExternalCompanyResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Get one external company
#[utoipa::path(
    get,
    path = "/api/admin/external-companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company retrieved successfully", body = ApiResponse<ExternalCompanyResponseDto>),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "Company not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_company(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<CompanyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExternalCompanyResponseDto>>> {
    let company = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(company.into()), None, None)))
}

/// Enable or disable platform access for a company's maintainer accounts
#[utoipa::path(
    patch,
    path = "/api/admin/external-companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = UpdatePlatformAccessDto,
    responses(
        (status = 200, description = "Platform access updated", body = ApiResponse<ExternalCompanyResponseDto>),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "Company not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_platform_access(
    RequireAdministrator(_admin): RequireAdministrator,
    State(service): State<Arc<CompanyService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePlatformAccessDto>,
) -> Result<Json<ApiResponse<ExternalCompanyResponseDto>>> {
    let company = service.set_platform_access(id, dto.platform_access).await?;
    Ok(Json(ApiResponse::success(Some(company.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{administrator_user, citizen_user, lazy_pool, with_auth};
    use axum::routing::post;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    fn create_router() -> Router {
        let service = Arc::new(CompanyService::new(lazy_pool()));
        Router::new()
            .route("/api/admin/external-companies", post(create_company))
            .with_state(service)
    }

    #[tokio::test]
    async fn create_requires_administrator() {
        let server = TestServer::new(with_auth(create_router(), citizen_user())).unwrap();

        let response = server
            .post("/api/admin/external-companies")
            .json(&json!({"name": "Verde Urbano Srl", "categories": ["parks_and_greenery"]}))
            .await;

        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let server = TestServer::new(create_router()).unwrap();

        let response = server
            .post("/api/admin/external-companies")
            .json(&json!({"name": "Verde Urbano Srl", "categories": ["parks_and_greenery"]}))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn create_rejects_empty_categories() {
        let server = TestServer::new(with_auth(create_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/external-companies")
            .json(&json!({"name": "Verde Urbano Srl", "categories": []}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_rejects_three_categories() {
        let server = TestServer::new(with_auth(create_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/external-companies")
            .json(&json!({
                "name": "Tuttofare Spa",
                "categories": ["waste", "public_lighting", "roads_and_sidewalks"]
            }))
            .await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let server = TestServer::new(with_auth(create_router(), administrator_user())).unwrap();

        let response = server
            .post("/api/admin/external-companies")
            .json(&json!({"name": " ", "categories": ["waste"]}))
            .await;

        response.assert_status_bad_request();
    }
}
