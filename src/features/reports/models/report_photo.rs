use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a photo attached to a report
#[derive(Debug, Clone, FromRow)]
pub struct ReportPhoto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub object_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// A photo already pushed to object storage, waiting to be linked to a report
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub object_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}
