use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a message on the public report thread
#[derive(Debug, Clone, FromRow)]
pub struct ReportMessage {
    pub id: Uuid,
    pub report_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
