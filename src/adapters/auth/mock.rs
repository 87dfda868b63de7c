//! Mock session validator for testing.
//!
//! Implements the `SessionValidator` port without signing real tokens.
//!
//! # Example
//!
//! ```ignore
//! use ghorkhoje_chat::adapters::auth::MockSessionValidator;
//!
//! let validator = MockSessionValidator::new()
//!     .with_test_user("token-a", 1, false)
//!     .with_test_user("token-admin", 9, true);
//!
//! let principal = validator.validate("token-a").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal, UserId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to principals. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    /// Map of valid tokens to their principals
    tokens: RwLock<HashMap<String, Principal>>,
    /// Map of tokens that fail with a specific error
    failures: RwLock<HashMap<String, AuthError>>,
}

impl MockSessionValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a principal.
    pub fn with_principal(self, token: impl Into<String>, principal: Principal) -> Self {
        self.add_token(token, principal);
        self
    }

    /// Adds a valid token for a generated user named `User <id>`.
    pub fn with_test_user(self, token: impl Into<String>, user_id: i64, is_admin: bool) -> Self {
        let principal = Principal::new(
            UserId::from_raw(user_id),
            format!("User {}", user_id),
            is_admin,
        );
        self.with_principal(token, principal)
    }

    /// Makes a token fail with the given error (e.g. `TokenExpired`).
    pub fn with_failure(self, token: impl Into<String>, error: AuthError) -> Self {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(token.into(), error);
        }
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, principal: Principal) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), principal);
        }
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(token);
        }
    }

    /// Returns the number of registered valid tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let forced = self
            .failures
            .read()
            .map_err(|_| AuthError::service_unavailable("mock lock poisoned"))?
            .get(token)
            .cloned();
        if let Some(error) = forced {
            return Err(error);
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::service_unavailable("mock lock poisoned"))?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
