//! Message repository port.
//!
//! Messages form an append-only log per conversation. The log is read in
//! `(created_at, id)` ascending order through keyset pages so long
//! histories are never materialized in one query.

use async_trait::async_trait;

use crate::domain::chat::{Message, NewMessage};
use crate::domain::foundation::{ConversationId, DomainError, MessageId};

/// Default number of messages per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Keyset page request: messages strictly after `after`, up to `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<MessageId>,
    pub limit: u32,
}

impl PageRequest {
    /// Builds a request, clamping the limit into `1..=MAX_PAGE_SIZE`.
    pub fn new(after: Option<MessageId>, limit: Option<u32>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Self { after, limit }
    }

    /// The first page.
    pub fn first() -> Self {
        Self::new(None, None)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Cursor for the next page; `None` when this page is the last one.
    pub next_cursor: Option<MessageId>,
}

impl MessagePage {
    /// Builds a page from up to `limit + 1` rows fetched by an adapter.
    ///
    /// Adapters fetch one extra row to learn whether another page exists.
    pub fn from_overfetch(mut rows: Vec<Message>, limit: u32) -> Self {
        let limit = limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(Message::id)
        } else {
            None
        };
        Self {
            messages: rows,
            next_cursor,
        }
    }

    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_cursor: None,
        }
    }
}

/// Repository port for messages.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message, assigning id and creation time.
    ///
    /// The creation time is never earlier than the newest message already in
    /// the conversation, so the durable order matches append order.
    async fn append(&self, new: NewMessage) -> Result<Message, DomainError>;

    /// Find a message by id.
    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError>;

    /// One page of a conversation's messages, ascending.
    async fn list(
        &self,
        conversation: ConversationId,
        page: PageRequest,
    ) -> Result<MessagePage, DomainError>;

    /// Newest message of a conversation, if any.
    async fn last_in(&self, conversation: ConversationId) -> Result<Option<Message>, DomainError>;

    /// Persist read flag, content, status and `updated_at`.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message doesn't exist
    async fn update(&self, message: &Message) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::MessageText;
    use crate::domain::foundation::{Timestamp, UserId};

    fn message(id: i64) -> Message {
        Message::from_new(
            MessageId::from_raw(id),
            NewMessage {
                conversation_id: ConversationId::from_raw(1),
                sender_id: UserId::from_raw(1),
                content: MessageText::parse("hello", 10).unwrap(),
            },
            Timestamp::now(),
        )
    }

    #[test]
    fn page_request_clamps_limit() {
        assert_eq!(PageRequest::new(None, Some(0)).limit, 1);
        assert_eq!(PageRequest::new(None, Some(10_000)).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::first().limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn overfetch_sets_cursor_when_more_rows_exist() {
        let page = MessagePage::from_overfetch((1..=4).map(message).collect(), 3);

        assert_eq!(page.messages.len(), 3);
        assert_eq!(page.next_cursor, Some(MessageId::from_raw(3)));
    }

    #[test]
    fn overfetch_without_extra_row_is_last_page() {
        let page = MessagePage::from_overfetch((1..=3).map(message).collect(), 3);

        assert_eq!(page.messages.len(), 3);
        assert_eq!(page.next_cursor, None);
    }
}
