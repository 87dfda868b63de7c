//! User directory port.
//!
//! Users are owned by the account subsystem; the chat core only reads them
//! to resolve principals, validate receivers and render display names.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Principal, UserId};

/// Read model of a marketplace user as seen by the chat core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl UserRecord {
    /// Staff and superusers both count as support admins.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// Name shown to other participants, falling back to the email.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }

    pub fn to_principal(&self) -> Principal {
        Principal::new(self.id, self.display_name(), self.is_admin())
    }
}

/// Lookup of users by id.
///
/// # Contract
///
/// - `Ok(None)` when no user has this id
/// - `Err` only for infrastructure failures
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(full_name: &str, is_staff: bool, is_superuser: bool) -> UserRecord {
        UserRecord {
            id: UserId::from_raw(1),
            full_name: full_name.to_string(),
            email: "owner@ghorkhoje.test".to_string(),
            is_staff,
            is_superuser,
            is_active: true,
        }
    }

    #[test]
    fn staff_or_superuser_is_admin() {
        assert!(!record("A", false, false).is_admin());
        assert!(record("A", true, false).is_admin());
        assert!(record("A", false, true).is_admin());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(record("Karim", false, false).display_name(), "Karim");
        assert_eq!(record("  ", false, false).display_name(), "owner@ghorkhoje.test");
    }

    #[test]
    fn to_principal_carries_admin_flag() {
        let principal = record("Nadia", true, false).to_principal();
        assert!(principal.is_admin);
        assert_eq!(principal.display_name, "Nadia");
    }
}
