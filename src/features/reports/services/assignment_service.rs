use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{AssignableExternalDto, AssignableTechnicalDto};
use crate::features::reports::services::ReportService;

/// Service resolving who a report can be assigned to.
///
/// Candidates come straight from the category matrix: technical users whose
/// role set intersects the eligible roles, and maintainers whose company
/// covers the category and still has platform access.
pub struct AssignmentService {
    pool: PgPool,
    reports: Arc<ReportService>,
}

impl AssignmentService {
    pub fn new(pool: PgPool, reports: Arc<ReportService>) -> Self {
        Self { pool, reports }
    }

    pub async fn assignable_technicals(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<AssignableTechnicalDto>> {
        let report = self.reports.get(report_id).await?;
        let eligible = report.category.eligible_roles().to_vec();

        sqlx::query_as::<_, AssignableTechnicalDto>(
            r#"
            SELECT u.id, u.first_name, u.last_name,
                   COALESCE(array_agg(ur.role) FILTER (WHERE ur.role IS NOT NULL),
                            ARRAY[]::user_role[]) AS roles
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.id IN (SELECT user_id FROM user_roles WHERE role = ANY($1))
            GROUP BY u.id
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .bind(eligible)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assignable technicals: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn assignable_externals(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<AssignableExternalDto>> {
        let report = self.reports.get(report_id).await?;

        sqlx::query_as::<_, AssignableExternalDto>(
            r#"
            SELECT u.id, u.first_name, u.last_name, c.id AS company_id, c.name AS company_name
            FROM users u
            JOIN external_companies c ON c.id = u.external_company_id
            JOIN external_company_categories cc ON cc.company_id = c.id
            JOIN user_roles ur ON ur.user_id = u.id AND ur.role = 'external_maintainer'
            WHERE c.platform_access = TRUE AND cc.category = $1
            ORDER BY c.name, u.last_name, u.first_name
            "#,
        )
        .bind(report.category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assignable externals: {:?}", e);
            AppError::Database(e)
        })
    }
}
