use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Request DTO for posting a message or an internal note
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageDto {
    pub content: String,
}

/// Response DTO for a message on the public thread
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MessageResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Response DTO for a staff-only note
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NoteResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
