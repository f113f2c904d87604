use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::companies::CompanyService;
use crate::features::notifications::NotificationService;
use crate::features::reports::dtos::{AssignExternalDto, ReportResponseDto};
use crate::features::reports::models::{Report, ReportStatus};
use crate::features::reports::services::report_service::REPORT_COLUMNS;
use crate::features::reports::services::ReportService;
use crate::features::users::models::UserRole;
use crate::features::users::UserService;
use crate::shared::constants::MAX_REJECTION_REASON_CHARS;

/// Message appended to the public thread when triage approves a report.
const APPROVAL_MESSAGE: &str =
    "Your report has been approved and taken in charge by the municipality.";

/// Service for the report state machine: triage, direct status changes and
/// external delegation.
///
/// Input validation runs before any row is loaded, so malformed requests
/// never touch the database.
pub struct WorkflowService {
    pool: PgPool,
    reports: Arc<ReportService>,
    users: Arc<UserService>,
    companies: Arc<CompanyService>,
    notifications: Arc<NotificationService>,
}

impl WorkflowService {
    pub fn new(
        pool: PgPool,
        reports: Arc<ReportService>,
        users: Arc<UserService>,
        companies: Arc<CompanyService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            reports,
            users,
            companies,
            notifications,
        }
    }

    // =========================================================================
    // Pure validation
    // =========================================================================

    /// Trims and bounds a rejection reason: empty is a malformed request,
    /// over-long is a domain-rule violation.
    pub fn validate_rejection_reason(reason: &str) -> Result<String> {
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest(
                "Rejection reason is required".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_REJECTION_REASON_CHARS {
            return Err(AppError::UnprocessableEntity(format!(
                "Rejection reason must be at most {MAX_REJECTION_REASON_CHARS} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Only the three handler-reachable statuses may be set directly;
    /// everything else travels through approve/reject/assign-external.
    pub fn validate_direct_target(status: ReportStatus) -> Result<()> {
        if !status.is_valid_direct_target() {
            return Err(AppError::BadRequest(format!(
                "{status} is not a valid direct status target"
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Triage
    // =========================================================================

    pub async fn approve(
        &self,
        report_id: Uuid,
        actor: &AuthenticatedUser,
        technical_id: Uuid,
    ) -> Result<ReportResponseDto> {
        let report = self.reports.get(report_id).await?;

        if report.status != ReportStatus::PendingApproval {
            return Err(AppError::BadRequest(
                "Report is not pending approval".to_string(),
            ));
        }

        let technical = self
            .users
            .find_by_id(technical_id)
            .await?
            .ok_or_else(|| AppError::UnprocessableEntity("technical not found".to_string()))?;

        if !technical.holds_any(report.category.eligible_roles()) {
            return Err(AppError::UnprocessableEntity(
                "invalid role for category".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = 'assigned', assigned_officer_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#,
        ))
        .bind(report.id)
        .bind(technical.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to approve report: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("INSERT INTO report_messages (report_id, sender_id, content) VALUES ($1, $2, $3)")
            .bind(updated.id)
            .bind(actor.id)
            .bind(APPROVAL_MESSAGE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to append approval message: {:?}", e);
                AppError::Database(e)
            })?;

        self.notifications
            .report_approved(updated.reporter_id, &updated)
            .await?;
        self.notifications
            .report_assigned(technical.id, &updated)
            .await?;

        tracing::info!(
            "Report approved: id={}, officer={}, by={}",
            updated.id,
            technical.id,
            actor.id
        );

        self.reports.response_for(updated, actor.id).await
    }

    pub async fn reject(
        &self,
        report_id: Uuid,
        actor: &AuthenticatedUser,
        reason: &str,
    ) -> Result<ReportResponseDto> {
        let reason = Self::validate_rejection_reason(reason)?;

        let report = self.reports.get(report_id).await?;

        if report.status != ReportStatus::PendingApproval {
            return Err(AppError::BadRequest(
                "Report is not pending approval".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = 'rejected', rejected_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#,
        ))
        .bind(report.id)
        .bind(&reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reject report: {:?}", e);
            AppError::Database(e)
        })?;

        self.notifications
            .report_rejected(updated.reporter_id, &updated, &reason)
            .await?;

        tracing::info!("Report rejected: id={}, by={}", updated.id, actor.id);

        self.reports.response_for(updated, actor.id).await
    }

    // =========================================================================
    // Handling
    // =========================================================================

    pub async fn update_status(
        &self,
        report_id: Uuid,
        actor: &AuthenticatedUser,
        new_status: ReportStatus,
    ) -> Result<ReportResponseDto> {
        Self::validate_direct_target(new_status)?;

        let report = self.reports.get(report_id).await?;

        if !report.is_assigned_officer(actor.id) && !report.is_assigned_maintainer(actor.id) {
            return Err(AppError::Forbidden(
                "Only the assigned handler may change the status".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2,
                resolved_at = CASE WHEN $2 = 'resolved'::report_status THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#,
        ))
        .bind(report.id)
        .bind(new_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        self.notifications
            .report_status_changed(updated.reporter_id, &updated, new_status)
            .await?;

        tracing::info!(
            "Report status changed: id={}, status={}, by={}",
            updated.id,
            new_status,
            actor.id
        );

        self.reports.response_for(updated, actor.id).await
    }

    pub async fn assign_external(
        &self,
        report_id: Uuid,
        actor: &AuthenticatedUser,
        dto: AssignExternalDto,
    ) -> Result<ReportResponseDto> {
        let report = self.reports.get(report_id).await?;

        if !report.is_assigned_officer(actor.id) {
            return Err(AppError::Forbidden(
                "Only the assigned officer may delegate a report".to_string(),
            ));
        }

        let company = self
            .companies
            .find_by_id(dto.company_id)
            .await?
            .ok_or_else(|| AppError::UnprocessableEntity("company not found".to_string()))?;

        if !company.platform_access {
            return Err(AppError::UnprocessableEntity(
                "Company does not have platform access".to_string(),
            ));
        }
        if !company.covers_category(report.category) {
            return Err(AppError::UnprocessableEntity(
                "Company does not cover this report category".to_string(),
            ));
        }

        let maintainer = self
            .users
            .find_by_id(dto.maintainer_id)
            .await?
            .ok_or_else(|| AppError::UnprocessableEntity("maintainer not found".to_string()))?;

        if !maintainer.has_role(UserRole::ExternalMaintainer) {
            return Err(AppError::UnprocessableEntity(
                "User is not an external maintainer".to_string(),
            ));
        }
        if maintainer.external_company_id != Some(company.id) {
            return Err(AppError::UnprocessableEntity(
                "Maintainer does not belong to this company".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = 'external_assigned',
                external_maintainer_id = $2,
                external_company_id = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#,
        ))
        .bind(report.id)
        .bind(maintainer.id)
        .bind(company.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delegate report: {:?}", e);
            AppError::Database(e)
        })?;

        self.notifications
            .report_status_changed(updated.reporter_id, &updated, ReportStatus::ExternalAssigned)
            .await?;
        self.notifications
            .report_assigned(maintainer.id, &updated)
            .await?;

        tracing::info!(
            "Report delegated: id={}, company={}, maintainer={}, by={}",
            updated.id,
            company.id,
            maintainer.id,
            actor.id
        );

        self.reports.response_for(updated, actor.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rejection_reason_is_a_bad_request() {
        let err = WorkflowService::validate_rejection_reason("   ").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn oversize_rejection_reason_is_unprocessable() {
        let reason = "x".repeat(MAX_REJECTION_REASON_CHARS + 1);
        let err = WorkflowService::validate_rejection_reason(&reason).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn rejection_reason_is_trimmed_and_kept() {
        let reason = WorkflowService::validate_rejection_reason("  duplicate report  ").unwrap();
        assert_eq!(reason, "duplicate report");
    }

    #[test]
    fn boundary_rejection_reason_passes() {
        let reason = "x".repeat(MAX_REJECTION_REASON_CHARS);
        assert!(WorkflowService::validate_rejection_reason(&reason).is_ok());
    }

    #[test]
    fn only_handling_statuses_are_direct_targets() {
        assert!(WorkflowService::validate_direct_target(ReportStatus::InProgress).is_ok());
        assert!(WorkflowService::validate_direct_target(ReportStatus::Suspended).is_ok());
        assert!(WorkflowService::validate_direct_target(ReportStatus::Resolved).is_ok());

        for status in [
            ReportStatus::PendingApproval,
            ReportStatus::Assigned,
            ReportStatus::Rejected,
            ReportStatus::ExternalAssigned,
        ] {
            let err = WorkflowService::validate_direct_target(status).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }
}
