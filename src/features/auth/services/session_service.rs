use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, SessionResponseDto, SessionUserDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::verify_password;
use crate::features::auth::services::token_service::TokenService;
use crate::features::users::models::User;
use crate::features::users::UserService;

/// Service for opening sessions: credential check, maintainer platform-access
/// gate, token issuance.
pub struct SessionService {
    pool: PgPool,
    users: Arc<UserService>,
    tokens: Arc<TokenService>,
}

impl SessionService {
    pub fn new(pool: PgPool, users: Arc<UserService>, tokens: Arc<TokenService>) -> Self {
        Self {
            pool,
            users,
            tokens,
        }
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<SessionResponseDto> {
        let email = dto.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        self.check_platform_access(&user).await?;

        let identity = AuthenticatedUser {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
            external_company_id: user.external_company_id,
        };

        let issued = self.tokens.issue(&identity)?;

        tracing::info!("Session opened: user={}, roles={:?}", user.id, user.roles);

        Ok(SessionResponseDto {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: SessionUserDto::from(user),
        })
    }

    /// Maintainers may only log in while their company keeps platform access.
    async fn check_platform_access(&self, user: &User) -> Result<()> {
        if !user.has_role(crate::features::users::models::UserRole::ExternalMaintainer) {
            return Ok(());
        }

        let company_id = user.external_company_id.ok_or_else(|| {
            AppError::Forbidden("Maintainer account has no linked company".to_string())
        })?;

        let has_access = sqlx::query_scalar::<_, bool>(
            "SELECT platform_access FROM external_companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check company platform access: {:?}", e);
            AppError::Database(e)
        })?
        .unwrap_or(false);

        if !has_access {
            return Err(AppError::Forbidden(
                "Platform access is disabled for your company".to_string(),
            ));
        }

        Ok(())
    }
}
