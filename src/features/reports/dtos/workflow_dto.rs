use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::reports::models::ReportStatus;
use crate::features::users::models::UserRole;

/// Request DTO for approving a pending report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveReportDto {
    /// Technical-office user who will own the report
    pub technical_id: Uuid,
}

/// Request DTO for rejecting a pending report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RejectReportDto {
    pub reason: String,
}

/// Request DTO for a direct status change by the assigned handler
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
}

/// Request DTO for delegating a report to an external company
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignExternalDto {
    pub company_id: Uuid,
    pub maintainer_id: Uuid,
}

/// Technical-office user eligible to take a report
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssignableTechnicalDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<UserRole>,
}

/// External maintainer eligible to take a report
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssignableExternalDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company_id: Uuid,
    pub company_name: String,
}
