//! Authentication types for the domain layer.
//!
//! A [`Principal`] is the identity attached to a live connection or REST
//! request after its bearer token has been validated. It carries only what
//! the chat core needs: who the user is, how to display them, and whether
//! they belong to the support staff.

use super::UserId;
use thiserror::Error;

/// Authenticated identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The user's identifier in the user directory.
    pub user_id: UserId,

    /// Full name shown as `sender` on outbound messages.
    pub display_name: String,

    /// Staff or superuser. Admins join the support group and may access
    /// every user-to-admin conversation.
    pub is_admin: bool,
}

impl Principal {
    /// Creates a new principal.
    pub fn new(user_id: UserId, display_name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            is_admin,
        }
    }
}

/// Authentication errors that can occur while resolving a principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was supplied; the caller is anonymous.
    #[error("Authentication credentials were not provided")]
    MissingToken,

    /// The token is malformed or its signature does not verify.
    #[error("Invalid token")]
    InvalidToken,

    /// The signature is valid but the token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the subject no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// The subject exists but the account is deactivated.
    #[error("User account is inactive")]
    InactiveUser,

    /// The user lookup failed for infrastructure reasons.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the client should obtain a new token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::UserNotFound
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_new_sets_fields() {
        let principal = Principal::new(UserId::from_raw(1), "Rahim Uddin", false);

        assert_eq!(principal.user_id.as_i64(), 1);
        assert_eq!(principal.display_name, "Rahim Uddin");
        assert!(!principal.is_admin);
    }

    #[test]
    fn auth_error_token_expired_displays_correctly() {
        assert_eq!(format!("{}", AuthError::TokenExpired), "Token expired");
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::MissingToken.requires_reauthentication());
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::InactiveUser.requires_reauthentication());
        assert!(!AuthError::service_unavailable("db down").requires_reauthentication());
    }

    #[test]
    fn auth_error_is_transient_for_service_errors() {
        assert!(AuthError::service_unavailable("timeout").is_transient());
        assert!(!AuthError::InvalidToken.is_transient());
    }
}
