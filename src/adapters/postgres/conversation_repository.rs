//! PostgreSQL implementation of ConversationRepository.
//!
//! Pair uniqueness is enforced by a partial unique index over
//! `(LEAST(user_id, other_user_id), GREATEST(user_id, other_user_id))`; a
//! violation surfaces as `ErrorCode::Conflict` so callers can re-read.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::chat::{Conversation, ConversationKind, Counterpart, NewConversation, UserPair};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, Principal, Timestamp, UserId,
};
use crate::ports::ConversationRepository;

const COLUMNS: &str = "id, conversation_type, user_id, other_user_id, admin_user_id, title, \
                       created_at, updated_at, is_active, is_archived";

/// PostgreSQL implementation of ConversationRepository.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn insert(&self, new: NewConversation) -> Result<Conversation, DomainError> {
        let (other_user_id, admin_user_id) = match new.counterpart {
            Counterpart::User(other) => (Some(other.as_i64()), None),
            Counterpart::Admin(admin) => (None, admin.map(|a| a.as_i64())),
        };

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO conversations (
                conversation_type, user_id, other_user_id, admin_user_id, title,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(new.counterpart.kind().as_str())
        .bind(new.user.as_i64())
        .bind(other_user_id)
        .bind(admin_user_id)
        .bind(&new.title)
        .bind(new.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::new(
                ErrorCode::Conflict,
                "conversation already exists for user pair",
            ),
            _ => DomainError::database("Failed to insert conversation", e),
        })?;

        row_to_conversation(&row)
    }

    async fn find_by_id(&self, id: ConversationId) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM conversations WHERE id = $1", COLUMNS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch conversation", e))?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE conversation_type = 'user_to_user'
              AND LEAST(user_id, other_user_id) = $1
              AND GREATEST(user_id, other_user_id) = $2
            "#,
            COLUMNS
        ))
        .bind(pair.low().as_i64())
        .bind(pair.high().as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch conversation by pair", e))?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn find_open_support(&self, user: UserId) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE conversation_type = 'user_to_admin' AND user_id = $1 AND is_active
            ORDER BY id DESC
            LIMIT 1
            "#,
            COLUMNS
        ))
        .bind(user.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch support conversation", e))?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn list_for(&self, principal: &Principal) -> Result<Vec<Conversation>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE user_id = $1
               OR other_user_id = $1
               OR admin_user_id = $1
               OR ($2 AND conversation_type = 'user_to_admin')
            ORDER BY updated_at DESC, id DESC
            "#,
            COLUMNS
        ))
        .bind(principal.user_id.as_i64())
        .bind(principal.is_admin)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list conversations", e))?;

        rows.iter().map(row_to_conversation).collect()
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations SET
                admin_user_id = $2,
                title = $3,
                updated_at = $4,
                is_active = $5,
                is_archived = $6
            WHERE id = $1
            "#,
        )
        .bind(conversation.id().as_i64())
        .bind(conversation.admin_user().map(|a| a.as_i64()))
        .bind(conversation.title())
        .bind(conversation.updated_at().as_datetime())
        .bind(conversation.is_active())
        .bind(conversation.is_archived())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update conversation", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("conversation {} not found", conversation.id()),
            ));
        }

        Ok(())
    }

    async fn touch(&self, id: ConversationId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE conversations SET updated_at = GREATEST(updated_at, $2) WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to touch conversation", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("conversation {} not found", id),
            ));
        }

        Ok(())
    }
}

// === Helper Functions ===

fn row_to_conversation(row: &PgRow) -> Result<Conversation, DomainError> {
    let kind: ConversationKind = row
        .try_get::<String, _>("conversation_type")
        .map_err(|e| DomainError::database("Failed to read conversation_type", e))?
        .parse()?;
    let other_user_id: Option<i64> = row.get("other_user_id");
    let admin_user_id: Option<i64> = row.get("admin_user_id");

    let counterpart = match kind {
        ConversationKind::UserToUser => {
            let other = other_user_id.ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    "user-to-user conversation without other_user_id",
                )
            })?;
            Counterpart::User(UserId::from_raw(other))
        }
        ConversationKind::UserToAdmin => Counterpart::Admin(admin_user_id.map(UserId::from_raw)),
    };

    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    Ok(Conversation::reconstitute(
        ConversationId::from_raw(row.get("id")),
        UserId::from_raw(row.get("user_id")),
        counterpart,
        row.get("title"),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        row.get("is_active"),
        row.get("is_archived"),
    ))
}
