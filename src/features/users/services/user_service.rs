use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::services::hash_password;
use crate::features::users::dtos::SignupRequestDto;
use crate::features::users::models::{CreateUser, User, UserRole};
use crate::shared::validation::PERSON_NAME_REGEX;

/// Service for account creation and lookups.
///
/// Every read hydrates the role set from `user_roles` in the same query, so
/// callers always see a complete identity.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Signup & creation
    // =========================================================================

    /// Register a citizen account from the public signup form.
    pub async fn signup_citizen(&self, dto: SignupRequestDto) -> Result<User> {
        if !PERSON_NAME_REGEX.is_match(dto.first_name.trim()) {
            return Err(AppError::Validation(
                "first name contains invalid characters".to_string(),
            ));
        }
        if !PERSON_NAME_REGEX.is_match(dto.last_name.trim()) {
            return Err(AppError::Validation(
                "last name contains invalid characters".to_string(),
            ));
        }

        let password_hash = hash_password(&dto.password)?;

        self.create_with_roles(CreateUser {
            email: dto.email.trim().to_lowercase(),
            password_hash,
            first_name: dto.first_name.trim().to_string(),
            last_name: dto.last_name.trim().to_string(),
            roles: vec![UserRole::Citizen],
            external_company_id: None,
        })
        .await
    }

    /// Create an account with an explicit role set. User row and role rows
    /// land in one transaction.
    pub async fn create_with_roles(&self, data: CreateUser) -> Result<User> {
        if self.email_exists(&data.email).await? {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin user creation transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let (id, created_at, updated_at) =
            sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>)>(
                r#"
                INSERT INTO users (email, password_hash, first_name, last_name, external_company_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, created_at, updated_at
                "#,
            )
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.external_company_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert user: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            SELECT $1, unnest($2::user_role[])
            "#,
        )
        .bind(id)
        .bind(&data.roles)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert user roles: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit user creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("User created: id={}, roles={:?}", id, data.roles);

        Ok(User {
            id,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            external_company_id: data.external_company_id,
            telegram_chat_id: None,
            roles: data.roles,
            created_at,
            updated_at,
        })
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name,
                   u.external_company_id, u.telegram_chat_id,
                   COALESCE(array_agg(ur.role) FILTER (WHERE ur.role IS NOT NULL),
                            ARRAY[]::user_role[]) AS roles,
                   u.created_at, u.updated_at
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.email = $1
            GROUP BY u.id
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user by email: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name,
                   u.external_company_id, u.telegram_chat_id,
                   COALESCE(array_agg(ur.role) FILTER (WHERE ur.role IS NOT NULL),
                            ARRAY[]::user_role[]) AS roles,
                   u.created_at, u.updated_at
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user by id: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Page through every account, newest first.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name,
                   u.external_company_id, u.telegram_chat_id,
                   COALESCE(array_agg(ur.role) FILTER (WHERE ur.role IS NOT NULL),
                            ARRAY[]::user_role[]) AS roles,
                   u.created_at, u.updated_at
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((users, total))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check email existence: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Used at startup to decide whether the bootstrap administrator is needed.
    pub async fn administrator_exists(&self) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE role = 'administrator')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check for administrator account: {:?}", e);
            AppError::Database(e)
        })
    }
}
