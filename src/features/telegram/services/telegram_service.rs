use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::TelegramConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::services::ReportService;
use crate::features::telegram::dtos::{LinkChatDto, LinkTokenResponseDto};
use crate::features::telegram::models::TelegramLinkToken;

/// Account linking between citizens and their telegram chats, plus the
/// read surface the bot renders.
///
/// Tokens are minted on the authenticated web side and consumed by the bot
/// over plain HTTP; a chat id binds to at most one user.
pub struct TelegramService {
    pool: PgPool,
    reports: Arc<ReportService>,
    bot_username: String,
    link_token_ttl: Duration,
}

impl TelegramService {
    pub fn new(pool: PgPool, reports: Arc<ReportService>, config: &TelegramConfig) -> Self {
        Self {
            pool,
            reports,
            bot_username: config.bot_username.clone(),
            link_token_ttl: config.link_token_ttl,
        }
    }

    // =========================================================================
    // Token primitives
    // =========================================================================

    /// 32 random bytes, hex-encoded. 64 chars of plaintext.
    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    fn deep_link(&self, token: &str) -> String {
        format!("https://t.me/{}?start={}", self.bot_username, token)
    }

    /// Shape check before touching the database: anything that is not
    /// 64 hex chars cannot be one of our tokens.
    fn is_well_formed(token: &str) -> bool {
        token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub async fn create_link_token(&self, user_id: Uuid) -> Result<LinkTokenResponseDto> {
        let token = Self::generate_token();
        let token_hash = Self::hash_token(&token);
        let expires_at = Utc::now() + chrono::Duration::seconds(self.link_token_ttl.as_secs() as i64);

        sqlx::query(
            "INSERT INTO telegram_link_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store link token: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Minted telegram link token for user {}", user_id);

        Ok(LinkTokenResponseDto {
            deep_link: self.deep_link(&token),
            token,
            expires_at,
        })
    }

    /// Consume a token and bind the chat to its owner.
    ///
    /// Unknown, expired and already-consumed tokens all answer 404 so the
    /// bot cannot distinguish guessing from racing. Re-linking the same
    /// chat to the same user is idempotent; a chat held by someone else is
    /// a conflict.
    pub async fn link(&self, dto: LinkChatDto) -> Result<()> {
        if !Self::is_well_formed(&dto.token) {
            return Err(AppError::BadRequest("Malformed link token".to_string()));
        }

        self.purge_expired_tokens().await?;

        let token = sqlx::query_as::<_, TelegramLinkToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, consumed_at, created_at
            FROM telegram_link_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(Self::hash_token(&dto.token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up link token: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Link token not found or expired".to_string()))?;

        if token.is_consumed() || token.is_expired(Utc::now()) {
            return Err(AppError::NotFound(
                "Link token not found or expired".to_string(),
            ));
        }

        let holder = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE telegram_chat_id = $1",
        )
        .bind(dto.chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check chat binding: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(holder_id) = holder {
            if holder_id != token.user_id {
                return Err(AppError::Conflict(
                    "Chat is already linked to another account".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin link transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("UPDATE telegram_link_tokens SET consumed_at = NOW() WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to consume link token: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query("UPDATE users SET telegram_chat_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(dto.chat_id)
            .bind(token.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to bind chat to user: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit link transaction: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Linked telegram chat {} to user {}", dto.chat_id, token.user_id);
        Ok(())
    }

    pub async fn check_linked(&self, chat_id: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE telegram_chat_id = $1)",
        )
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to probe chat linkage: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Reports filed by the linked user, newest first; unlinked chats are
    /// a 404 so the bot can prompt for linking.
    pub async fn reports_for_chat(&self, chat_id: i64) -> Result<Vec<ReportResponseDto>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE telegram_chat_id = $1",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve chat owner: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Chat is not linked to any account".to_string()))?;

        self.reports.list_for_reporter(user_id).await
    }

    async fn purge_expired_tokens(&self) -> Result<()> {
        let purged = sqlx::query("DELETE FROM telegram_link_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge expired link tokens: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();

        if purged > 0 {
            tracing::debug!("Purged {} expired telegram link tokens", purged);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_64_hex_chars() {
        let token = TelegramService::generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Two mints never collide
        assert_ne!(token, TelegramService::generate_token());
    }

    #[test]
    fn hashing_is_deterministic_and_one_way() {
        let token = TelegramService::generate_token();
        assert_eq!(
            TelegramService::hash_token(&token),
            TelegramService::hash_token(&token)
        );
        assert_ne!(TelegramService::hash_token(&token), token);
        assert_eq!(TelegramService::hash_token(&token).len(), 64);
    }

    #[test]
    fn shape_check_filters_foreign_strings() {
        assert!(TelegramService::is_well_formed(&"a".repeat(64)));
        assert!(TelegramService::is_well_formed(
            &TelegramService::generate_token()
        ));

        assert!(!TelegramService::is_well_formed(""));
        assert!(!TelegramService::is_well_formed(&"a".repeat(63)));
        assert!(!TelegramService::is_well_formed(&"g".repeat(64)));
        assert!(!TelegramService::is_well_formed(&"A".repeat(65)));
    }

    #[tokio::test]
    async fn deep_link_embeds_bot_and_token() {
        let service = TelegramService::new(
            crate::shared::test_helpers::lazy_pool(),
            Arc::new(ReportService::new(crate::shared::test_helpers::lazy_pool())),
            &TelegramConfig {
                bot_username: "ParticipiumBot".to_string(),
                link_token_ttl: Duration::from_secs(600),
            },
        );

        let link = service.deep_link("deadbeef");
        assert_eq!(link, "https://t.me/ParticipiumBot?start=deadbeef");
    }
}
