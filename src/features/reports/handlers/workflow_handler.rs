use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequirePublicRelations, RequireTechnicalStaff};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    ApproveReportDto, AssignExternalDto, AssignableExternalDto, AssignableTechnicalDto,
    RejectReportDto, ReportResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::handlers::ReportsState;
use crate::shared::types::ApiResponse;

/// Approve a pending report
///
/// Moves the report to `assigned` under the chosen technical officer, posts
/// the standard take-in-charge message and notifies both sides.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/approve",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ApproveReportDto,
    responses(
        (status = 200, description = "Report approved and assigned", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Report is not pending approval"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Public relations access required"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Chosen officer cannot take this category")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_report(
    RequirePublicRelations(user): RequirePublicRelations,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ApproveReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.workflow.approve(id, &user, dto.technical_id).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report approved".to_string()),
        None,
    )))
}

/// Reject a pending report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/reject",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = RejectReportDto,
    responses(
        (status = 200, description = "Report rejected", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Report is not pending approval or reason is blank"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Public relations access required"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Reason too long")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_report(
    RequirePublicRelations(user): RequirePublicRelations,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RejectReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.workflow.reject(id, &user, &dto.reason).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report rejected".to_string()),
        None,
    )))
}

/// Change the working status of a report
///
/// Only the assigned handler (the technical officer, or the maintainer once
/// delegated) may move a report between `in_progress`, `suspended` and
/// `resolved`.
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Target status is not reachable directly"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not the assigned handler"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_report_status(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.workflow.update_status(id, &user, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Delegate a report to an external company
///
/// The assigned technical officer hands the report to a maintainer of a
/// company that covers the category and has platform access.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assign-external",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = AssignExternalDto,
    responses(
        (status = 200, description = "Report delegated", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not the assigned officer"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Company or maintainer not eligible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_external(
    RequireTechnicalStaff(user): RequireTechnicalStaff,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignExternalDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.workflow.assign_external(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report delegated to external maintainer".to_string()),
        None,
    )))
}

/// List technical officers eligible for a report's category
#[utoipa::path(
    get,
    path = "/api/reports/{id}/assignable-technicals",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Eligible technical officers", body = ApiResponse<Vec<AssignableTechnicalDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Public relations access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assignable_technicals(
    RequirePublicRelations(_user): RequirePublicRelations,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AssignableTechnicalDto>>>> {
    let officers = state.assignments.assignable_technicals(id).await?;
    Ok(Json(ApiResponse::success(Some(officers), None, None)))
}

/// List external maintainers eligible for a report's category
#[utoipa::path(
    get,
    path = "/api/reports/{id}/assignable-externals",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Eligible external maintainers", body = ApiResponse<Vec<AssignableExternalDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Technical staff access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assignable_externals(
    RequireTechnicalStaff(_user): RequireTechnicalStaff,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AssignableExternalDto>>>> {
    let maintainers = state.assignments.assignable_externals(id).await?;
    Ok(Json(ApiResponse::success(Some(maintainers), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, patch, post};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{
        citizen_user, offline_reports_state, public_relations_user, technical_user, with_auth,
    };

    fn workflow_router() -> Router {
        Router::new()
            .route("/api/reports/{id}/approve", post(approve_report))
            .route("/api/reports/{id}/reject", post(reject_report))
            .route("/api/reports/{id}/status", patch(update_report_status))
            .route("/api/reports/{id}/assign-external", post(assign_external))
            .route(
                "/api/reports/{id}/assignable-technicals",
                get(list_assignable_technicals),
            )
            .with_state(offline_reports_state())
    }

    #[tokio::test]
    async fn approve_requires_public_relations() {
        let server = TestServer::new(with_auth(workflow_router(), citizen_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/approve", Uuid::now_v7()))
            .json(&json!({ "technical_id": Uuid::now_v7() }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reject_rejects_blank_reason() {
        let server = TestServer::new(with_auth(workflow_router(), public_relations_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/reject", Uuid::now_v7()))
            .json(&json!({ "reason": "   " }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reject_rejects_oversize_reason() {
        let server = TestServer::new(with_auth(workflow_router(), public_relations_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/reject", Uuid::now_v7()))
            .json(&json!({ "reason": "x".repeat(501) }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn status_change_rejects_non_handling_target() {
        let server = TestServer::new(with_auth(
            workflow_router(),
            technical_user(UserRole::RoadMaintenance),
        ))
        .unwrap();

        let response = server
            .patch(&format!("/api/reports/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "assigned" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assign_external_requires_technical_staff() {
        let server = TestServer::new(with_auth(workflow_router(), citizen_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/assign-external", Uuid::now_v7()))
            .json(&json!({ "company_id": Uuid::now_v7(), "maintainer_id": Uuid::now_v7() }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn assignable_technicals_is_triage_only() {
        let server = TestServer::new(with_auth(
            workflow_router(),
            technical_user(UserRole::GreenSpaces),
        ))
        .unwrap();

        let response = server
            .get(&format!(
                "/api/reports/{}/assignable-technicals",
                Uuid::now_v7()
            ))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
