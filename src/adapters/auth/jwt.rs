//! HS256 JWT adapter for access-token validation.
//!
//! This adapter implements the `SessionValidator` port for the access tokens
//! issued by the marketplace's account service. It validates a token by:
//!
//! 1. Verifying the HS256 signature against the shared signing secret
//! 2. Verifying expiry (`exp` is required)
//! 3. Rejecting refresh tokens (`token_type` other than `access`)
//! 4. Looking up the user named by the `user_id` claim in the user directory
//! 5. Mapping the user to a domain `Principal`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghorkhoje_chat::adapters::auth::{JwtConfig, JwtSessionValidator};
//!
//! let validator = JwtSessionValidator::new(JwtConfig::new(secret), users);
//! let principal = validator.validate("eyJ...").await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, Principal, UserId};
use crate::ports::{SessionValidator, UserDirectory};

/// The only algorithm accepted. Tokens signed with anything else fail.
pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Configuration for the JWT adapter.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret.
    pub secret: SecretString,

    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Create a configuration with no leeway.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            leeway_secs: 0,
        }
    }

    /// Set the tolerated clock skew.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - the user's numeric id.
    pub user_id: i64,

    /// Expiry timestamp (Unix epoch seconds).
    pub exp: u64,

    /// `access` or `refresh`. Absent on tokens minted by older issuers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl AccessClaims {
    fn is_refresh_token(&self) -> bool {
        matches!(self.token_type.as_deref(), Some(kind) if kind != "access")
    }
}

/// `SessionValidator` backed by HS256 JWTs and the user directory.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserDirectory>,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig, users: Arc<dyn UserDirectory>) -> Self {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
            users,
        }
    }

    /// Verify signature and expiry, returning the claims.
    fn decode_claims(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            },
        )?;

        if data.claims.is_refresh_token() {
            tracing::debug!("Refresh token presented as access token");
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id = UserId::new(claims.user_id).map_err(|_| AuthError::InvalidToken)?;

        let record = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !record.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok(record.to_principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserDirectory;
    use crate::ports::UserRecord;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret-at-least-32-bytes!!";

    fn now_secs() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    fn sign(claims: &AccessClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(user_id: i64, exp: u64) -> AccessClaims {
        AccessClaims {
            user_id,
            exp,
            token_type: Some("access".to_string()),
        }
    }

    fn user(id: i64, is_staff: bool, is_active: bool) -> UserRecord {
        UserRecord {
            id: UserId::from_raw(id),
            full_name: format!("User {}", id),
            email: format!("user{}@ghorkhoje.test", id),
            is_staff,
            is_superuser: false,
            is_active,
        }
    }

    fn validator() -> JwtSessionValidator {
        let users = InMemoryUserDirectory::new()
            .with_user(user(1, false, true))
            .with_user(user(2, true, true))
            .with_user(user(3, false, false));
        JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())),
            Arc::new(users),
        )
    }

    #[tokio::test]
    async fn valid_token_resolves_principal() {
        let token = sign(&claims(1, now_secs() + 600), SECRET);

        let principal = validator().validate(&token).await.unwrap();

        assert_eq!(principal.user_id.as_i64(), 1);
        assert_eq!(principal.display_name, "User 1");
        assert!(!principal.is_admin);
    }

    #[tokio::test]
    async fn staff_user_resolves_as_admin() {
        let token = sign(&claims(2, now_secs() + 600), SECRET);

        let principal = validator().validate(&token).await.unwrap();

        assert!(principal.is_admin);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_as_expired() {
        let token = sign(&claims(1, now_secs() - 3600), SECRET);

        let result = validator().validate(&token).await;

        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_as_invalid() {
        let token = sign(&claims(1, now_secs() + 600), "another-secret-entirely-different!!");

        let result = validator().validate(&token).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_rejected_as_invalid() {
        let result = validator().validate("not-a-jwt").await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn refresh_token_is_rejected() {
        let mut refresh = claims(1, now_secs() + 600);
        refresh.token_type = Some("refresh".to_string());

        let result = validator().validate(&sign(&refresh, SECRET)).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let token = sign(&claims(99, now_secs() + 600), SECRET);

        let result = validator().validate(&token).await;

        assert_eq!(result, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn inactive_user_is_rejected() {
        let token = sign(&claims(3, now_secs() + 600), SECRET);

        let result = validator().validate(&token).await;

        assert_eq!(result, Err(AuthError::InactiveUser));
    }
}
