use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::companies::models::ExternalCompany;
use crate::features::reports::models::ReportCategory;

/// Request DTO for registering an external company
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExternalCompanyDto {
    #[validate(length(min = 1, max = 120, message = "Company name must be 1-120 characters"))]
    pub name: String,

    /// Competence categories, at most two
    pub categories: Vec<ReportCategory>,

    /// Whether maintainer accounts of this company may log in (defaults to false)
    pub platform_access: Option<bool>,
}

/// Request DTO for toggling a company's platform access
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePlatformAccessDto {
    pub platform_access: bool,
}

/// Response DTO for an external company
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExternalCompanyResponseDto {
    pub id: Uuid,
    pub name: String,
    pub platform_access: bool,
    pub categories: Vec<ReportCategory>,
    pub created_at: DateTime<Utc>,
}

impl From<ExternalCompany> for ExternalCompanyResponseDto {
    fn from(company: ExternalCompany) -> Self {
        Self {
            id: company.id,
            name: company.name,
            platform_access: company.platform_access,
            categories: company.categories,
            created_at: company.created_at,
        }
    }
}
