use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::reports::models::ReportCategory;

/// Database model for an external maintenance company
#[derive(Debug, Clone, FromRow)]
pub struct ExternalCompany {
    pub id: Uuid,
    pub name: String,
    pub platform_access: bool,
    pub categories: Vec<ReportCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExternalCompany {
    pub fn covers_category(&self, category: ReportCategory) -> bool {
        self.categories.contains(&category)
    }
}

/// Data for registering a new external company
#[derive(Debug)]
pub struct CreateExternalCompany {
    pub name: String,
    pub categories: Vec<ReportCategory>,
    pub platform_access: bool,
}
