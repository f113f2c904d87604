use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::companies::dtos::CreateExternalCompanyDto;
use crate::features::companies::models::{CreateExternalCompany, ExternalCompany};
use crate::features::reports::models::ReportCategory;
use crate::shared::validation::COMPANY_NAME_REGEX;

const MAX_COMPANY_CATEGORIES: usize = 2;

/// Service for the external-company registry.
///
/// Reads hydrate the competence categories from
/// `external_company_categories` in the same query.
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, dto: CreateExternalCompanyDto) -> Result<ExternalCompany> {
        let name = dto.name.trim().to_string();
        if !COMPANY_NAME_REGEX.is_match(&name) {
            return Err(AppError::Validation(
                "company name contains invalid characters".to_string(),
            ));
        }

        let categories = Self::normalize_categories(dto.categories)?;

        if self.name_exists(&name).await? {
            return Err(AppError::Conflict(
                "Company name is already registered".to_string(),
            ));
        }

        self.create(CreateExternalCompany {
            name,
            categories,
            platform_access: dto.platform_access.unwrap_or(false),
        })
        .await
    }

    /// Deduplicates and bounds the competence categories: at least one, at
    /// most two.
    fn normalize_categories(categories: Vec<ReportCategory>) -> Result<Vec<ReportCategory>> {
        let mut normalized: Vec<ReportCategory> = Vec::new();
        for category in categories {
            if !normalized.contains(&category) {
                normalized.push(category);
            }
        }

        if normalized.is_empty() {
            return Err(AppError::BadRequest(
                "At least one competence category is required".to_string(),
            ));
        }
        if normalized.len() > MAX_COMPANY_CATEGORIES {
            return Err(AppError::UnprocessableEntity(
                "A company may cover at most two categories".to_string(),
            ));
        }

        Ok(normalized)
    }

    async fn create(&self, data: CreateExternalCompany) -> Result<ExternalCompany> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin company registration transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let (id, created_at, updated_at) =
            sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>)>(
                r#"
                INSERT INTO external_companies (name, platform_access)
                VALUES ($1, $2)
                RETURNING id, created_at, updated_at
                "#,
            )
            .bind(&data.name)
            .bind(data.platform_access)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert company: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            INSERT INTO external_company_categories (company_id, category)
            SELECT $1, unnest($2::report_category[])
            "#,
        )
        .bind(id)
        .bind(&data.categories)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert company categories: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit company registration: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "External company registered: id={}, categories={:?}",
            id,
            data.categories
        );

        Ok(ExternalCompany {
            id,
            name: data.name,
            platform_access: data.platform_access,
            categories: data.categories,
            created_at,
            updated_at,
        })
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<ExternalCompany>, i64)> {
        let companies = sqlx::query_as::<_, ExternalCompany>(
            r#"
            SELECT c.id, c.name, c.platform_access,
                   COALESCE(array_agg(cc.category) FILTER (WHERE cc.category IS NOT NULL),
                            ARRAY[]::report_category[]) AS categories,
                   c.created_at, c.updated_at
            FROM external_companies c
            LEFT JOIN external_company_categories cc ON cc.company_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list companies: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM external_companies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count companies: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((companies, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ExternalCompany>> {
        sqlx::query_as::<_, ExternalCompany>(
            r#"
            SELECT c.id, c.name, c.platform_access,
                   COALESCE(array_agg(cc.category) FILTER (WHERE cc.category IS NOT NULL),
                            ARRAY[]::report_category[]) AS categories,
                   c.created_at, c.updated_at
            FROM external_companies c
            LEFT JOIN external_company_categories cc ON cc.company_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch company by id: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<ExternalCompany> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
    }

    /// Flip the login gate for a company's maintainer accounts. Open sessions
    /// stay valid until they expire; only new logins are blocked.
    pub async fn set_platform_access(&self, id: Uuid, enabled: bool) -> Result<ExternalCompany> {
        let updated = sqlx::query(
            "UPDATE external_companies SET platform_access = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update platform access: {:?}", e);
            AppError::Database(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Company not found".to_string()));
        }

        tracing::info!("Platform access for company {} set to {}", id, enabled);

        self.get(id).await
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM external_companies WHERE name = $1)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check company name: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rejects_empty_category_list() {
        let err = CompanyService::normalize_categories(vec![]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn normalize_rejects_more_than_two_categories() {
        let err = CompanyService::normalize_categories(vec![
            ReportCategory::Waste,
            ReportCategory::PublicLighting,
            ReportCategory::RoadsAndSidewalks,
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn normalize_collapses_duplicates() {
        let categories = CompanyService::normalize_categories(vec![
            ReportCategory::Waste,
            ReportCategory::Waste,
            ReportCategory::PublicLighting,
        ])
        .unwrap();
        assert_eq!(
            categories,
            vec![ReportCategory::Waste, ReportCategory::PublicLighting]
        );
    }
}
