//! In-memory user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{UserDirectory, UserRecord};

/// User directory held in memory. Useful for testing and development.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user while building the directory.
    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.get_mut().insert(user.id, user);
        self
    }

    /// Adds an active user named `User <id>`.
    pub fn with_test_user(self, id: i64, is_admin: bool) -> Self {
        self.with_user(UserRecord {
            id: UserId::from_raw(id),
            full_name: format!("User {}", id),
            email: format!("user{}@ghorkhoje.test", id),
            is_staff: is_admin,
            is_superuser: false,
            is_active: true,
        })
    }

    /// Adds or replaces a user at runtime.
    pub async fn upsert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
