use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::telegram::handlers;
use crate::features::telegram::services::TelegramService;

/// Bot-facing routes; the bot authenticates nothing, tokens and chat
/// bindings carry the trust.
pub fn public_routes(service: Arc<TelegramService>) -> Router {
    Router::new()
        .route("/api/telegram/link", post(handlers::link_chat))
        .route("/api/telegram/check-linked", get(handlers::check_linked))
        .route("/api/telegram/reports", get(handlers::chat_reports))
        .with_state(service)
}

/// Citizen-facing route for minting link tokens.
pub fn protected_routes(service: Arc<TelegramService>) -> Router {
    Router::new()
        .route(
            "/api/telegram/link-token",
            post(handlers::create_link_token),
        )
        .with_state(service)
}
