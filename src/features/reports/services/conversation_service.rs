use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::NotificationService;
use crate::features::reports::dtos::{MessageResponseDto, NoteResponseDto};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportService;
use crate::shared::constants::MAX_MESSAGE_CONTENT_CHARS;

/// Service for the two conversation surfaces of a report: the public
/// message thread and the staff-only note trail.
///
/// Content bounds are checked before the report is even loaded; party checks
/// follow, then the append and the fan-out to the other side.
pub struct ConversationService {
    pool: PgPool,
    reports: Arc<ReportService>,
    notifications: Arc<NotificationService>,
}

impl ConversationService {
    pub fn new(
        pool: PgPool,
        reports: Arc<ReportService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            reports,
            notifications,
        }
    }

    // =========================================================================
    // Pure validation
    // =========================================================================

    /// Shared bound for messages and notes: empty is malformed, over-long is
    /// a domain-rule violation.
    pub fn validate_content(content: &str) -> Result<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("Content is required".to_string()));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CONTENT_CHARS {
            return Err(AppError::UnprocessableEntity(format!(
                "Content must be at most {MAX_MESSAGE_CONTENT_CHARS} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    // =========================================================================
    // Public thread
    // =========================================================================

    pub async fn send_message(
        &self,
        report_id: Uuid,
        sender: &AuthenticatedUser,
        content: &str,
    ) -> Result<MessageResponseDto> {
        let content = Self::validate_content(content)?;

        let report = self.reports.get(report_id).await?;

        let is_party = report.reporter_id == sender.id
            || report.is_assigned_officer(sender.id)
            || report.is_assigned_maintainer(sender.id);
        if !is_party {
            return Err(AppError::Forbidden(
                "Only the reporter and the assigned handlers may write here".to_string(),
            ));
        }

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO report_messages (report_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(report.id)
        .bind(sender.id)
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report message: {:?}", e);
            AppError::Database(e)
        })?;

        let sender_name = sender.full_name();
        for recipient in self.other_parties(&report, sender.id) {
            self.notifications
                .message_received(recipient, &report, &sender_name)
                .await?;
        }

        Ok(MessageResponseDto {
            id,
            report_id: report.id,
            sender_id: sender.id,
            sender_name,
            content,
            created_at,
        })
    }

    /// Thread reads follow report-detail visibility: the owner, municipal
    /// staff and the assigned maintainer.
    pub async fn list_messages(
        &self,
        report_id: Uuid,
        viewer: &AuthenticatedUser,
    ) -> Result<Vec<MessageResponseDto>> {
        let report = self.reports.get(report_id).await?;

        let allowed = report.reporter_id == viewer.id
            || viewer.is_municipal_staff()
            || report.is_assigned_maintainer(viewer.id);
        if !allowed {
            return Err(AppError::Forbidden(
                "Not allowed to view this conversation".to_string(),
            ));
        }

        sqlx::query_as::<_, MessageResponseDto>(
            r#"
            SELECT m.id, m.report_id, m.sender_id,
                   u.first_name || ' ' || u.last_name AS sender_name,
                   m.content, m.created_at
            FROM report_messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.report_id = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(report.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list report messages: {:?}", e);
            AppError::Database(e)
        })
    }

    // =========================================================================
    // Internal notes
    // =========================================================================

    pub async fn create_internal_note(
        &self,
        report_id: Uuid,
        author: &AuthenticatedUser,
        content: &str,
    ) -> Result<NoteResponseDto> {
        let content = Self::validate_content(content)?;

        if !author.is_technical_staff() && !author.is_external_maintainer() {
            return Err(AppError::Forbidden(
                "Internal notes are restricted to technical staff and maintainers".to_string(),
            ));
        }

        let report = self.reports.get(report_id).await?;

        if !report.is_assigned_officer(author.id) && !report.is_assigned_maintainer(author.id) {
            return Err(AppError::Forbidden(
                "Only the assigned handlers may write internal notes".to_string(),
            ));
        }

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO internal_notes (report_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(report.id)
        .bind(author.id)
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert internal note: {:?}", e);
            AppError::Database(e)
        })?;

        let author_name = author.full_name();
        if let Some(counterpart) = self.note_counterpart(&report, author.id) {
            self.notifications
                .internal_note_added(counterpart, &report, &author_name)
                .await?;
        }

        Ok(NoteResponseDto {
            id,
            report_id: report.id,
            author_id: author.id,
            author_name,
            content,
            created_at,
        })
    }

    /// Notes are invisible to citizens and to triage; technical staff and
    /// the assigned maintainer read them.
    pub async fn list_internal_notes(
        &self,
        report_id: Uuid,
        viewer: &AuthenticatedUser,
    ) -> Result<Vec<NoteResponseDto>> {
        if !viewer.is_technical_staff() && !viewer.is_external_maintainer() {
            return Err(AppError::Forbidden(
                "Internal notes are restricted to technical staff and maintainers".to_string(),
            ));
        }

        let report = self.reports.get(report_id).await?;

        if viewer.is_external_maintainer() && !report.is_assigned_maintainer(viewer.id) {
            return Err(AppError::Forbidden(
                "Not allowed to view these notes".to_string(),
            ));
        }

        sqlx::query_as::<_, NoteResponseDto>(
            r#"
            SELECT n.id, n.report_id, n.author_id,
                   u.first_name || ' ' || u.last_name AS author_name,
                   n.content, n.created_at
            FROM internal_notes n
            JOIN users u ON u.id = n.author_id
            WHERE n.report_id = $1
            ORDER BY n.created_at
            "#,
        )
        .bind(report.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list internal notes: {:?}", e);
            AppError::Database(e)
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn other_parties(&self, report: &Report, sender_id: Uuid) -> Vec<Uuid> {
        let mut parties = vec![report.reporter_id];
        parties.extend(report.assigned_officer_id);
        parties.extend(report.external_maintainer_id);
        parties.retain(|id| *id != sender_id);
        parties.dedup();
        parties
    }

    fn note_counterpart(&self, report: &Report, author_id: Uuid) -> Option<Uuid> {
        if report.is_assigned_officer(author_id) {
            report.external_maintainer_id
        } else {
            report.assigned_officer_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{ReportCategory, ReportStatus};

    fn report_with(
        reporter: Uuid,
        officer: Option<Uuid>,
        maintainer: Option<Uuid>,
    ) -> Report {
        Report {
            id: Uuid::now_v7(),
            title: "Leaking hydrant".to_string(),
            description: "Water pooling on the sidewalk".to_string(),
            category: ReportCategory::WaterAndSewage,
            latitude: 45.07,
            longitude: 7.68,
            address: None,
            is_anonymous: false,
            status: ReportStatus::Assigned,
            reporter_id: reporter,
            assigned_officer_id: officer,
            external_maintainer_id: maintainer,
            external_company_id: maintainer.map(|_| Uuid::now_v7()),
            rejected_reason: None,
            resolved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_content_is_a_bad_request() {
        let err = ConversationService::validate_content(" \n ").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn oversize_content_is_unprocessable() {
        let content = "x".repeat(MAX_MESSAGE_CONTENT_CHARS + 1);
        let err = ConversationService::validate_content(&content).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn boundary_content_passes() {
        let content = "x".repeat(MAX_MESSAGE_CONTENT_CHARS);
        assert!(ConversationService::validate_content(&content).is_ok());
    }

    fn offline_service() -> ConversationService {
        use crate::shared::test_helpers::lazy_pool;
        ConversationService::new(
            lazy_pool(),
            Arc::new(ReportService::new(lazy_pool())),
            Arc::new(NotificationService::new(lazy_pool())),
        )
    }

    #[tokio::test]
    async fn message_fan_out_skips_the_sender() {
        let reporter = Uuid::now_v7();
        let officer = Uuid::now_v7();
        let maintainer = Uuid::now_v7();
        let service = offline_service();

        let report = report_with(reporter, Some(officer), Some(maintainer));

        let recipients = service.other_parties(&report, officer);
        assert_eq!(recipients, vec![reporter, maintainer]);

        let recipients = service.other_parties(&report, reporter);
        assert_eq!(recipients, vec![officer, maintainer]);
    }

    #[tokio::test]
    async fn note_counterpart_is_the_other_assigned_party() {
        let reporter = Uuid::now_v7();
        let officer = Uuid::now_v7();
        let maintainer = Uuid::now_v7();
        let service = offline_service();

        let report = report_with(reporter, Some(officer), Some(maintainer));
        assert_eq!(service.note_counterpart(&report, officer), Some(maintainer));
        assert_eq!(service.note_counterpart(&report, maintainer), Some(officer));

        let internal_only = report_with(reporter, Some(officer), None);
        assert_eq!(service.note_counterpart(&internal_only, officer), None);
    }
}
