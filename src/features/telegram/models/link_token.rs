use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A single-use telegram link token row. Only the SHA-256 digest of the
/// plaintext token is stored; the plaintext travels once, inside the deep
/// link handed to the citizen.
#[derive(Debug, Clone, FromRow)]
pub struct TelegramLinkToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TelegramLinkToken {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>, consumed_at: Option<DateTime<Utc>>) -> TelegramLinkToken {
        TelegramLinkToken {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            token_hash: "ab".repeat(32),
            expires_at,
            consumed_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_is_inclusive_at_the_boundary() {
        let now = Utc::now();
        assert!(token(now, None).is_expired(now));
        assert!(token(now - Duration::seconds(1), None).is_expired(now));
        assert!(!token(now + Duration::minutes(10), None).is_expired(now));
    }

    #[test]
    fn consumed_token_is_flagged() {
        let now = Utc::now();
        assert!(token(now + Duration::minutes(10), Some(now)).is_consumed());
        assert!(!token(now + Duration::minutes(10), None).is_consumed());
    }
}
