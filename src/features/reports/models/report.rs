use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ReportCategory;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    PendingApproval,
    Assigned,
    Rejected,
    InProgress,
    Suspended,
    ExternalAssigned,
    Resolved,
}

impl ReportStatus {
    /// Statuses an assigned handler may move a report into directly.
    /// Everything else travels through approval or external delegation.
    pub fn is_valid_direct_target(&self) -> bool {
        matches!(
            self,
            ReportStatus::InProgress | ReportStatus::Suspended | ReportStatus::Resolved
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::PendingApproval => write!(f, "pending_approval"),
            ReportStatus::Assigned => write!(f, "assigned"),
            ReportStatus::Rejected => write!(f, "rejected"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Suspended => write!(f, "suspended"),
            ReportStatus::ExternalAssigned => write!(f, "external_assigned"),
            ReportStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub is_anonymous: bool,
    pub status: ReportStatus,
    pub reporter_id: Uuid,
    pub assigned_officer_id: Option<Uuid>,
    pub external_maintainer_id: Option<Uuid>,
    pub external_company_id: Option<Uuid>,
    pub rejected_reason: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn is_assigned_officer(&self, user_id: Uuid) -> bool {
        self.assigned_officer_id == Some(user_id)
    }

    pub fn is_assigned_maintainer(&self, user_id: Uuid) -> bool {
        self.external_maintainer_id == Some(user_id)
    }
}

/// Data for creating a new report
#[derive(Debug)]
pub struct CreateReport {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub is_anonymous: bool,
    pub reporter_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_targets_are_the_three_handling_statuses() {
        assert!(ReportStatus::InProgress.is_valid_direct_target());
        assert!(ReportStatus::Suspended.is_valid_direct_target());
        assert!(ReportStatus::Resolved.is_valid_direct_target());

        assert!(!ReportStatus::PendingApproval.is_valid_direct_target());
        assert!(!ReportStatus::Assigned.is_valid_direct_target());
        assert!(!ReportStatus::Rejected.is_valid_direct_target());
        assert!(!ReportStatus::ExternalAssigned.is_valid_direct_target());
    }

    #[test]
    fn assigned_party_checks_distinguish_officer_and_maintainer() {
        let officer = Uuid::now_v7();
        let maintainer = Uuid::now_v7();
        let report = Report {
            id: Uuid::now_v7(),
            title: "Broken streetlight".to_string(),
            description: "The lamp at the corner flickers all night".to_string(),
            category: ReportCategory::PublicLighting,
            latitude: 45.0703,
            longitude: 7.6869,
            address: None,
            is_anonymous: false,
            status: ReportStatus::ExternalAssigned,
            reporter_id: Uuid::now_v7(),
            assigned_officer_id: Some(officer),
            external_maintainer_id: Some(maintainer),
            external_company_id: Some(Uuid::now_v7()),
            rejected_reason: None,
            resolved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(report.is_assigned_officer(officer));
        assert!(report.is_assigned_maintainer(maintainer));
        assert!(!report.is_assigned_maintainer(officer));
        assert!(!report.is_assigned_officer(Uuid::now_v7()));
    }
}
