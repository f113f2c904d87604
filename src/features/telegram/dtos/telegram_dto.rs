use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Response DTO for a freshly minted link token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkTokenResponseDto {
    /// Plaintext token; shown exactly once
    pub token: String,
    /// `t.me` URL that opens the bot chat with the token as start payload
    pub deep_link: String,
    pub expires_at: DateTime<Utc>,
}

/// Request DTO the bot sends when a citizen opens the deep link
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkChatDto {
    pub token: String,
    /// Telegram chat identifier
    pub chat_id: i64,
}

/// Query parameter shared by the bot-facing lookups
#[derive(Debug, Deserialize, IntoParams)]
pub struct ChatQuery {
    pub chat_id: i64,
}

/// Response DTO for the linkage probe
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkStatusDto {
    pub linked: bool,
}
