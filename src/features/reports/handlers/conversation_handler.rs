use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CreateMessageDto, MessageResponseDto, NoteResponseDto};
use crate::features::reports::handlers::ReportsState;
use crate::shared::types::ApiResponse;

/// List the public thread of a report
///
/// Same visibility as the report detail: reporter, municipal staff and the
/// assigned maintainer.
#[utoipa::path(
    get,
    path = "/api/reports/{id}/messages",
    tag = "conversation",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Messages in thread order", body = ApiResponse<Vec<MessageResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not allowed to view this conversation"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_report_messages(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<MessageResponseDto>>>> {
    let messages = state.conversations.list_messages(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(messages), None, None)))
}

/// Post a message on a report's public thread
///
/// Open to the reporter and the assigned handlers; the other parties are
/// notified.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/messages",
    tag = "conversation",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = CreateMessageDto,
    responses(
        (status = 201, description = "Message posted", body = ApiResponse<MessageResponseDto>),
        (status = 400, description = "Content is empty"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not a party to this report"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Content too long")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_report_message(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponseDto>>)> {
    let message = state
        .conversations
        .send_message(id, &user, &dto.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(message), None, None)),
    ))
}

/// List the internal notes of a report
///
/// Staff-side channel: technical officers and the assigned maintainer.
/// Citizens and triage never see it.
#[utoipa::path(
    get,
    path = "/api/reports/{id}/internal-notes",
    tag = "conversation",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Notes in thread order", body = ApiResponse<Vec<NoteResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Internal notes are restricted"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_report_notes(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<NoteResponseDto>>>> {
    let notes = state.conversations.list_internal_notes(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(notes), None, None)))
}

/// Add an internal note to a report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/internal-notes",
    tag = "conversation",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = CreateMessageDto,
    responses(
        (status = 201, description = "Note added", body = ApiResponse<NoteResponseDto>),
        (status = 400, description = "Content is empty"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not an assigned handler"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Content too long")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_report_note(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<NoteResponseDto>>)> {
    let note = state
        .conversations
        .create_internal_note(id, &user, &dto.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(note), None, None)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::shared::test_helpers::{citizen_user, offline_reports_state, with_auth};

    fn conversation_router() -> Router {
        Router::new()
            .route(
                "/api/reports/{id}/messages",
                get(list_report_messages).post(create_report_message),
            )
            .route(
                "/api/reports/{id}/internal-notes",
                get(list_report_notes).post(create_report_note),
            )
            .with_state(offline_reports_state())
    }

    #[tokio::test]
    async fn messages_require_authentication() {
        let server = TestServer::new(conversation_router()).unwrap();

        let response = server
            .get(&format!("/api/reports/{}/messages", Uuid::now_v7()))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn message_rejects_empty_content() {
        let server = TestServer::new(with_auth(conversation_router(), citizen_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/messages", Uuid::now_v7()))
            .json(&json!({ "content": "  " }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn message_rejects_oversize_content() {
        let server = TestServer::new(with_auth(conversation_router(), citizen_user())).unwrap();

        let response = server
            .post(&format!("/api/reports/{}/messages", Uuid::now_v7()))
            .json(&json!({ "content": "x".repeat(2001) }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn internal_notes_are_closed_to_citizens() {
        let server = TestServer::new(with_auth(conversation_router(), citizen_user())).unwrap();

        let write = server
            .post(&format!("/api/reports/{}/internal-notes", Uuid::now_v7()))
            .json(&json!({ "content": "crew scheduled for monday" }))
            .await;
        assert_eq!(write.status_code(), StatusCode::FORBIDDEN);

        let read = server
            .get(&format!("/api/reports/{}/internal-notes", Uuid::now_v7()))
            .await;
        assert_eq!(read.status_code(), StatusCode::FORBIDDEN);
    }
}
