//! PostgreSQL implementation of UserDirectory.
//!
//! Reads the `users` table owned by the account service.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{UserDirectory, UserRecord};

#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, is_staff, is_superuser, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch user", e))?;

        Ok(row.map(|row| UserRecord {
            id: UserId::from_raw(row.get("id")),
            full_name: row.get("full_name"),
            email: row.get("email"),
            is_staff: row.get("is_staff"),
            is_superuser: row.get("is_superuser"),
            is_active: row.get("is_active"),
        }))
    }
}
