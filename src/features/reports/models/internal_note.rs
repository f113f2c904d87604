use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a staff-only note on a report
#[derive(Debug, Clone, FromRow)]
pub struct InternalNote {
    pub id: Uuid,
    pub report_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
