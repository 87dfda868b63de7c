//! In-memory message repository.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::{Message, NewMessage};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, MessageId, Timestamp,
};
use crate::ports::{MessagePage, MessageRepository, PageRequest};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<MessageId, Message>,
}

impl State {
    fn ordered_in(&self, conversation: ConversationId) -> Vec<&Message> {
        let mut rows: Vec<&Message> = self
            .rows
            .values()
            .filter(|m| m.conversation_id() == conversation)
            .collect();
        rows.sort_by_key(|m| (m.created_at(), m.id()));
        rows
    }
}

/// Message log held in memory.
///
/// `set_fail_appends(true)` makes every append fail with a database error,
/// which lets callers exercise the persistence-failure path.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    state: RwLock<State>,
    fail_appends: AtomicBool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Every stored message of a conversation in durable order.
    pub async fn all_in(&self, conversation: ConversationId) -> Vec<Message> {
        self.state
            .read()
            .await
            .ordered_in(conversation)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, new: NewMessage) -> Result<Message, DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "message store unavailable",
            ));
        }

        let mut state = self.state.write().await;
        let floor = state
            .ordered_in(new.conversation_id)
            .last()
            .map(|m| m.created_at());
        let created_at = match floor {
            Some(floor) => Timestamp::now().at_least(floor),
            None => Timestamp::now(),
        };

        state.next_id += 1;
        let id = MessageId::from_raw(state.next_id);
        let message = Message::from_new(id, new, created_at);
        state.rows.insert(id, message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        conversation: ConversationId,
        page: PageRequest,
    ) -> Result<MessagePage, DomainError> {
        let state = self.state.read().await;
        let ordered = state.ordered_in(conversation);

        let start = match page.after {
            Some(cursor) => match ordered.iter().position(|m| m.id() == cursor) {
                Some(index) => index + 1,
                None => return Ok(MessagePage::empty()),
            },
            None => 0,
        };

        let rows = ordered
            .into_iter()
            .skip(start)
            .take(page.limit as usize + 1)
            .cloned()
            .collect();
        Ok(MessagePage::from_overfetch(rows, page.limit))
    }

    async fn last_in(&self, conversation: ConversationId) -> Result<Option<Message>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .ordered_in(conversation)
            .last()
            .map(|m| (*m).clone()))
    }

    async fn update(&self, message: &Message) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&message.id()) {
            Some(row) => {
                *row = message.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::MessageNotFound,
                format!("message {} not found", message.id()),
            )),
        }
    }
}
