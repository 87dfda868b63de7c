//! IdentityResolver - Turns the connection credential into a principal.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, Principal};
use crate::ports::SessionValidator;

/// Resolves the bearer token attached to a connection request.
///
/// Resolution happens before a connection is accepted; a failure here means
/// the connection is never opened and no group is joined.
#[derive(Clone)]
pub struct IdentityResolver {
    validator: Arc<dyn SessionValidator>,
}

impl IdentityResolver {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }

    /// Resolves a possibly-absent token. Blank tokens count as missing.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        match self.validator.validate(token).await {
            Ok(principal) => {
                tracing::debug!(user_id = %principal.user_id, "Principal resolved");
                Ok(principal)
            }
            Err(error) => {
                tracing::info!(error = %error, "Credential rejected");
                Err(error)
            }
        }
    }
}
