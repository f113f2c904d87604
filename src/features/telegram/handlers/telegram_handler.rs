use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireCitizen;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::telegram::dtos::{
    ChatQuery, LinkChatDto, LinkStatusDto, LinkTokenResponseDto,
};
use crate::features::telegram::services::TelegramService;
use crate::shared::types::ApiResponse;

/// Mint a telegram link token
///
/// Returns the plaintext token and the `t.me` deep link; the token is
/// single-use and short-lived.
#[utoipa::path(
    post,
    path = "/api/telegram/link-token",
    tag = "telegram",
    responses(
        (status = 201, description = "Token minted", body = ApiResponse<LinkTokenResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_link_token(
    RequireCitizen(user): RequireCitizen,
    State(service): State<Arc<TelegramService>>,
) -> Result<(StatusCode, Json<ApiResponse<LinkTokenResponseDto>>)> {
    let token = service.create_link_token(user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(token), None, None)),
    ))
}

/// Link a telegram chat to the token's owner
///
/// Called by the bot when a citizen opens the deep link.
#[utoipa::path(
    post,
    path = "/api/telegram/link",
    tag = "telegram",
    request_body = LinkChatDto,
    responses(
        (status = 200, description = "Chat linked", body = ApiResponse<LinkStatusDto>),
        (status = 400, description = "Malformed token"),
        (status = 404, description = "Token not found, expired or already used"),
        (status = 409, description = "Chat already linked to another account")
    )
)]
pub async fn link_chat(
    State(service): State<Arc<TelegramService>>,
    AppJson(dto): AppJson<LinkChatDto>,
) -> Result<Json<ApiResponse<LinkStatusDto>>> {
    service.link(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(LinkStatusDto { linked: true }),
        Some("Telegram account linked".to_string()),
        None,
    )))
}

/// Probe whether a chat is linked
#[utoipa::path(
    get,
    path = "/api/telegram/check-linked",
    tag = "telegram",
    params(ChatQuery),
    responses(
        (status = 200, description = "Linkage state", body = ApiResponse<LinkStatusDto>)
    )
)]
pub async fn check_linked(
    State(service): State<Arc<TelegramService>>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ApiResponse<LinkStatusDto>>> {
    let linked = service.check_linked(query.chat_id).await?;
    Ok(Json(ApiResponse::success(
        Some(LinkStatusDto { linked }),
        None,
        None,
    )))
}

/// List the linked user's reports for the bot
#[utoipa::path(
    get,
    path = "/api/telegram/reports",
    tag = "telegram",
    params(ChatQuery),
    responses(
        (status = 200, description = "Reports filed by the linked user", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 404, description = "Chat is not linked")
    )
)]
pub async fn chat_reports(
    State(service): State<Arc<TelegramService>>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.reports_for_chat(query.chat_id).await?;
    Ok(Json(ApiResponse::success(Some(reports), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::reports::services::ReportService;
    use crate::shared::test_helpers::{lazy_pool, public_relations_user, with_auth};

    fn offline_service() -> Arc<TelegramService> {
        Arc::new(TelegramService::new(
            lazy_pool(),
            Arc::new(ReportService::new(lazy_pool())),
            &crate::core::config::TelegramConfig {
                bot_username: "ParticipiumBot".to_string(),
                link_token_ttl: std::time::Duration::from_secs(600),
            },
        ))
    }

    #[tokio::test]
    async fn link_token_is_citizen_only() {
        let app = Router::new()
            .route("/api/telegram/link-token", post(create_link_token))
            .with_state(offline_service());
        let server = TestServer::new(with_auth(app, public_relations_user())).unwrap();

        let response = server.post("/api/telegram/link-token").await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn link_token_requires_authentication() {
        let app = Router::new()
            .route("/api/telegram/link-token", post(create_link_token))
            .with_state(offline_service());
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/telegram/link-token").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn link_rejects_malformed_token_before_lookup() {
        let app = Router::new()
            .route("/api/telegram/link", post(link_chat))
            .with_state(offline_service());
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/telegram/link")
            .json(&json!({ "token": "not-hex", "chat_id": 42 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn check_linked_requires_numeric_chat_id() {
        let app = Router::new()
            .route("/api/telegram/check-linked", get(check_linked))
            .with_state(offline_service());
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/telegram/check-linked?chat_id=abc").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
