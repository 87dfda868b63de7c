//! Session validation port for bearer token validation.
//!
//! This port defines the contract for turning an access token into a
//! [`Principal`]. The realtime endpoint receives the token as the `token`
//! query parameter (browser WebSocket handshakes cannot carry custom
//! headers); REST requests carry it in the `Authorization` header. Both go
//! through the same validator.
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct JwtSessionValidator { ... }
//!
//! #[async_trait]
//! impl SessionValidator for JwtSessionValidator {
//!     async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
//!         // 1. Verify HS256 signature and expiry
//!         // 2. Look up the user named by the user_id claim
//!         // 3. Derive is_admin from staff/superuser flags
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal};

/// Validates access tokens and resolves the principal behind them.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature and expiry
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::UserNotFound` / `AuthError::InactiveUser` when the
///   subject cannot be used
/// - Perform no writes
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}
