use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::{Notification, NotificationKind};
use crate::features::notifications::services::messages;
use crate::features::reports::models::{Report, ReportStatus};

/// Service for the per-user notification inbox.
///
/// Dispatch is a synchronous insert in the caller's request; there is no
/// queue, so a failed write fails the operation that triggered it.
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub async fn dispatch(
        &self,
        user_id: Uuid,
        report_id: Option<Uuid>,
        kind: NotificationKind,
        message: String,
    ) -> Result<Notification> {
        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO notifications (user_id, report_id, kind, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(user_id)
        .bind(report_id)
        .bind(kind)
        .bind(&message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to dispatch notification: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!(
            "Notification dispatched: user={}, kind={:?}",
            user_id,
            kind
        );

        Ok(Notification {
            id,
            user_id,
            report_id,
            kind,
            message,
            is_read: false,
            created_at,
        })
    }

    pub async fn report_approved(&self, recipient: Uuid, report: &Report) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::ReportApproved,
            messages::report_approved(&report.title),
        )
        .await?;
        Ok(())
    }

    pub async fn report_rejected(
        &self,
        recipient: Uuid,
        report: &Report,
        reason: &str,
    ) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::ReportRejected,
            messages::report_rejected(&report.title, reason),
        )
        .await?;
        Ok(())
    }

    pub async fn report_assigned(&self, recipient: Uuid, report: &Report) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::ReportAssigned,
            messages::report_assigned(&report.title),
        )
        .await?;
        Ok(())
    }

    pub async fn report_status_changed(
        &self,
        recipient: Uuid,
        report: &Report,
        new_status: ReportStatus,
    ) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::ReportStatusChanged,
            messages::report_status_changed(&report.title, new_status),
        )
        .await?;
        Ok(())
    }

    pub async fn message_received(
        &self,
        recipient: Uuid,
        report: &Report,
        sender_name: &str,
    ) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::MessageReceived,
            messages::message_received(&report.title, sender_name),
        )
        .await?;
        Ok(())
    }

    pub async fn internal_note_added(
        &self,
        recipient: Uuid,
        report: &Report,
        author_name: &str,
    ) -> Result<()> {
        self.dispatch(
            recipient,
            Some(report.id),
            NotificationKind::InternalNoteAdded,
            messages::internal_note_added(&report.title, author_name),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Inbox reads & updates
    // =========================================================================

    pub async fn list(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Notification>, i64)> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, report_id, kind, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count notifications: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((notifications, total))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count unread notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Marks one row read. Rows belonging to another user are invisible here,
    /// so they 404 rather than 403.
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, report_id, kind, message, is_read, created_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification read: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }
}
