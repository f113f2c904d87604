use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::models::{CreateReport, Report, ReportPhoto, UploadedPhoto};

pub(crate) const REPORT_COLUMNS: &str = r#"
    id, title, description, category, latitude, longitude, address,
    is_anonymous, status, reporter_id, assigned_officer_id,
    external_maintainer_id, external_company_id, rejected_reason,
    resolved_at, created_at, updated_at
"#;

/// Service for filing reports and the per-audience listings.
///
/// Responses always carry the reporter identity (masked for anonymous
/// reports) and the photo set, batched per page.
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(
                "latitude must be between -90 and 90".to_string(),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(
                "longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert a report and its photos in one transaction. Photos are already
    /// in object storage at this point; a failed insert orphans at most one
    /// upload batch, which the bucket lifecycle sweeps out.
    pub async fn create(
        &self,
        data: CreateReport,
        photos: Vec<UploadedPhoto>,
    ) -> Result<(Report, Vec<ReportPhoto>)> {
        Self::validate_coordinates(data.latitude, data.longitude)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin report creation transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports
                (title, description, category, latitude, longitude, address,
                 is_anonymous, reporter_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REPORT_COLUMNS}
            "#,
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.address)
        .bind(data.is_anonymous)
        .bind(data.reporter_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        let mut stored_photos = Vec::with_capacity(photos.len());
        for photo in photos {
            let stored = sqlx::query_as::<_, ReportPhoto>(
                r#"
                INSERT INTO report_photos (report_id, object_key, url, content_type, size_bytes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, report_id, object_key, url, content_type, size_bytes, created_at
                "#,
            )
            .bind(report.id)
            .bind(&photo.object_key)
            .bind(&photo.url)
            .bind(&photo.content_type)
            .bind(photo.size_bytes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report photo: {:?}", e);
                AppError::Database(e)
            })?;
            stored_photos.push(stored);
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report filed: id={}, category={}, photos={}",
            report.id,
            report.category,
            stored_photos.len()
        );

        Ok((report, stored_photos))
    }

    // =========================================================================
    // Single-report reads
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Report> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    /// Detail view with access control: the owner, municipal staff and the
    /// assigned maintainer may look; other citizens may not.
    pub async fn get_for_viewer(
        &self,
        id: Uuid,
        viewer: &AuthenticatedUser,
    ) -> Result<ReportResponseDto> {
        let report = self.get(id).await?;

        let allowed = report.reporter_id == viewer.id
            || viewer.is_municipal_staff()
            || report.is_assigned_maintainer(viewer.id);
        if !allowed {
            return Err(AppError::Forbidden(
                "Not allowed to view this report".to_string(),
            ));
        }

        self.response_for(report, viewer.id).await
    }

    /// Build the response DTO for one report, fetching reporter name and
    /// photos.
    pub async fn response_for(&self, report: Report, viewer_id: Uuid) -> Result<ReportResponseDto> {
        let (first_name, last_name) = sqlx::query_as::<_, (String, String)>(
            "SELECT first_name, last_name FROM users WHERE id = $1",
        )
        .bind(report.reporter_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch reporter identity: {:?}", e);
            AppError::Database(e)
        })?;

        let photos = self.photos_for_report(report.id).await?;

        Ok(ReportResponseDto::from_parts(
            report,
            &first_name,
            &last_name,
            photos,
            viewer_id,
        ))
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Everyone-visible list: reports that passed triage. Pending and
    /// rejected reports stay between the reporter and the municipality.
    pub async fn list_shared(
        &self,
        viewer_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE status NOT IN ('pending_approval', 'rejected')
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list shared reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE status NOT IN ('pending_approval', 'rejected')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count shared reports: {:?}", e);
            AppError::Database(e)
        })?;

        let responses = self.to_responses(reports, viewer_id).await?;
        Ok((responses, total))
    }

    pub async fn list_mine(
        &self,
        reporter_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE reporter_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        ))
        .bind(reporter_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list own reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE reporter_id = $1")
                .bind(reporter_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count own reports: {:?}", e);
                    AppError::Database(e)
                })?;

        let responses = self.to_responses(reports, reporter_id).await?;
        Ok((responses, total))
    }

    /// Triage queue for public relations, oldest first.
    pub async fn list_pending(
        &self,
        viewer_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE status = 'pending_approval'
            ORDER BY created_at ASC
            OFFSET $1 LIMIT $2
            "#,
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pending reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE status = 'pending_approval'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count pending reports: {:?}", e);
            AppError::Database(e)
        })?;

        let responses = self.to_responses(reports, viewer_id).await?;
        Ok((responses, total))
    }

    pub async fn list_assigned(
        &self,
        officer_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE assigned_officer_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        ))
        .bind(officer_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assigned reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE assigned_officer_id = $1",
        )
        .bind(officer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count assigned reports: {:?}", e);
            AppError::Database(e)
        })?;

        let responses = self.to_responses(reports, officer_id).await?;
        Ok((responses, total))
    }

    pub async fn list_external(
        &self,
        maintainer_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE external_maintainer_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        ))
        .bind(maintainer_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list delegated reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE external_maintainer_id = $1",
        )
        .bind(maintainer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count delegated reports: {:?}", e);
            AppError::Database(e)
        })?;

        let responses = self.to_responses(reports, maintainer_id).await?;
        Ok((responses, total))
    }

    /// Reports filed by a user, for the telegram surface. Same shape as
    /// `list_mine` but without pagination; the bot renders the full set.
    pub async fn list_for_reporter(&self, reporter_id: Uuid) -> Result<Vec<ReportResponseDto>> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE reporter_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports for reporter: {:?}", e);
            AppError::Database(e)
        })?;

        self.to_responses(reports, reporter_id).await
    }

    // =========================================================================
    // Batched hydration
    // =========================================================================

    async fn to_responses(
        &self,
        reports: Vec<Report>,
        viewer_id: Uuid,
    ) -> Result<Vec<ReportResponseDto>> {
        if reports.is_empty() {
            return Ok(Vec::new());
        }

        let report_ids: Vec<Uuid> = reports.iter().map(|r| r.id).collect();
        let reporter_ids: Vec<Uuid> = reports.iter().map(|r| r.reporter_id).collect();

        let mut names = self.reporter_names(&reporter_ids).await?;
        let mut photos = self.photos_for_reports(&report_ids).await?;

        let mut responses = Vec::with_capacity(reports.len());
        for report in reports {
            let (first_name, last_name) = names
                .remove(&report.reporter_id)
                .unwrap_or_else(|| (String::new(), String::new()));
            let report_photos = photos.remove(&report.id).unwrap_or_default();
            responses.push(ReportResponseDto::from_parts(
                report,
                &first_name,
                &last_name,
                report_photos,
                viewer_id,
            ));
        }
        Ok(responses)
    }

    async fn reporter_names(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, (String, String)>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, first_name, last_name FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch reporter names: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, first, last)| (id, (first, last)))
            .collect())
    }

    async fn photos_for_report(&self, report_id: Uuid) -> Result<Vec<ReportPhoto>> {
        sqlx::query_as::<_, ReportPhoto>(
            r#"
            SELECT id, report_id, object_key, url, content_type, size_bytes, created_at
            FROM report_photos
            WHERE report_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report photos: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn photos_for_reports(
        &self,
        report_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ReportPhoto>>> {
        let rows = sqlx::query_as::<_, ReportPhoto>(
            r#"
            SELECT id, report_id, object_key, url, content_type, size_bytes, created_at
            FROM report_photos
            WHERE report_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(report_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report photos: {:?}", e);
            AppError::Database(e)
        })?;

        let mut by_report: HashMap<Uuid, Vec<ReportPhoto>> = HashMap::new();
        for photo in rows {
            by_report.entry(photo.report_id).or_default().push(photo);
        }
        Ok(by_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_outside_bounds_are_rejected() {
        assert!(ReportService::validate_coordinates(45.07, 7.68).is_ok());
        assert!(ReportService::validate_coordinates(-90.0, 180.0).is_ok());

        assert!(ReportService::validate_coordinates(90.5, 7.68).is_err());
        assert!(ReportService::validate_coordinates(45.07, -180.5).is_err());
        assert!(ReportService::validate_coordinates(f64::NAN, 7.68).is_err());
    }
}
