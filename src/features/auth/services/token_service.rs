use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, SessionClaims};

/// A freshly signed session token plus its lifetime in seconds.
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Issues and verifies HS256 session tokens.
///
/// Tokens are self-contained: identity and role set travel inside the claims,
/// so request authentication never touches the database.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    leeway: u64,
}

impl TokenService {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: config.token_ttl,
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
            company: user.external_company_id,
            iat: now,
            exp: now + self.token_ttl.as_secs() as i64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_in: self.token_ttl.as_secs() as i64,
        })
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session token: {}", e)))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{citizen_user, test_token_service};
    use uuid::Uuid;

    #[test]
    fn issue_then_verify_roundtrip() {
        let service = test_token_service();
        let user = citizen_user();

        let issued = service.issue(&user).unwrap();
        let verified = service.verify(&issued.token).unwrap();

        assert_eq!(verified.id, user.id);
        assert_eq!(verified.email, user.email);
        assert_eq!(verified.roles, user.roles);
        assert_eq!(verified.external_company_id, None);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = TokenService::new(&SessionConfig {
            jwt_secret: "a-different-secret-a-different-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
            jwt_leeway: Duration::from_secs(0),
        });
        let verifier = test_token_service();

        let issued = issuer.issue(&citizen_user()).unwrap();
        assert!(verifier.verify(&issued.token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_token_service();
        let user = citizen_user();

        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::now_v7(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
            company: None,
            iat: now - 300,
            exp: now - 120,
        };
        let stale = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("unit-test-secret-unit-test-secret!!".as_bytes()),
        )
        .unwrap();

        assert!(service.verify(&stale).is_err());
    }
}
