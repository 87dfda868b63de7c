//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::chat::{Message, MessageStatus, NewMessage};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, MessageId, Timestamp, UserId,
};
use crate::ports::{MessagePage, MessageRepository, PageRequest};

const COLUMNS: &str =
    "id, conversation_id, sender_id, content, attachment, created_at, updated_at, is_read, status";

/// PostgreSQL implementation of MessageRepository.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, new: NewMessage) -> Result<Message, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))?;

        // Serializes appends per conversation so created_at never goes backwards.
        sqlx::query("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
            .bind(new.conversation_id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to lock conversation", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ConversationNotFound,
                    format!("conversation {} not found", new.conversation_id),
                )
            })?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content, created_at, updated_at)
            SELECT $1, $2, $3, ts, ts
            FROM (
                SELECT GREATEST(
                    clock_timestamp(),
                    COALESCE(
                        (SELECT MAX(created_at) FROM messages WHERE conversation_id = $1),
                        clock_timestamp()
                    )
                ) AS ts
            ) AS floor
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(new.conversation_id.as_i64())
        .bind(new.sender_id.as_i64())
        .bind(new.content.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert message", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        row_to_message(&row)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM messages WHERE id = $1", COLUMNS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch message", e))?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn list(
        &self,
        conversation: ConversationId,
        page: PageRequest,
    ) -> Result<MessagePage, DomainError> {
        let fetch = i64::from(page.limit) + 1;

        let rows = match page.after {
            None => sqlx::query(&format!(
                r#"
                SELECT {}
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at ASC, id ASC
                LIMIT $2
                "#,
                COLUMNS
            ))
            .bind(conversation.as_i64())
            .bind(fetch)
            .fetch_all(&self.pool)
            .await,
            Some(cursor) => sqlx::query(&format!(
                r#"
                SELECT {}
                FROM messages m
                WHERE m.conversation_id = $1
                  AND (m.created_at, m.id) > (
                      SELECT c.created_at, c.id FROM messages c
                      WHERE c.id = $2 AND c.conversation_id = $1
                  )
                ORDER BY m.created_at ASC, m.id ASC
                LIMIT $3
                "#,
                COLUMNS
            ))
            .bind(conversation.as_i64())
            .bind(cursor.as_i64())
            .bind(fetch)
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(|e| DomainError::database("Failed to list messages", e))?;

        let messages = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MessagePage::from_overfetch(messages, page.limit))
    }

    async fn last_in(&self, conversation: ConversationId) -> Result<Option<Message>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            COLUMNS
        ))
        .bind(conversation.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch last message", e))?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn update(&self, message: &Message) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET
                content = $2,
                updated_at = $3,
                is_read = $4,
                status = $5
            WHERE id = $1
            "#,
        )
        .bind(message.id().as_i64())
        .bind(message.content())
        .bind(message.updated_at().as_datetime())
        .bind(message.is_read())
        .bind(message.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update message", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MessageNotFound,
                format!("message {} not found", message.id()),
            ));
        }

        Ok(())
    }
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let status: MessageStatus = row
        .try_get::<String, _>("status")
        .map_err(|e| DomainError::database("Failed to read message status", e))?
        .parse()?;
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    Ok(Message::reconstitute(
        MessageId::from_raw(row.get("id")),
        ConversationId::from_raw(row.get("conversation_id")),
        UserId::from_raw(row.get("sender_id")),
        row.get("content"),
        row.get("attachment"),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        row.get("is_read"),
        status,
    ))
}
