//! In-memory conversation repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::{Conversation, ConversationKind, NewConversation, UserPair};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, Principal, Timestamp, UserId,
};
use crate::ports::ConversationRepository;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<ConversationId, Conversation>,
}

/// Conversation store held in memory. Enforces pair uniqueness the same way
/// the PostgreSQL unique index does.
#[derive(Debug, Default)]
pub struct InMemoryConversationRepository {
    state: RwLock<State>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Number of user-to-user conversations stored for a pair.
    pub async fn count_for_pair(&self, pair: UserPair) -> usize {
        self.state
            .read()
            .await
            .rows
            .values()
            .filter(|c| c.user_pair() == Some(pair))
            .count()
    }
}

fn visible_to(conversation: &Conversation, principal: &Principal) -> bool {
    conversation.participants().contains(&principal.user_id)
        || (principal.is_admin && conversation.kind() == ConversationKind::UserToAdmin)
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn insert(&self, new: NewConversation) -> Result<Conversation, DomainError> {
        let mut state = self.state.write().await;

        if let Some(pair) = new.user_pair() {
            if state.rows.values().any(|c| c.user_pair() == Some(pair)) {
                return Err(DomainError::new(
                    ErrorCode::Conflict,
                    "conversation already exists for user pair",
                ));
            }
        }

        state.next_id += 1;
        let id = ConversationId::from_raw(state.next_id);
        let conversation = Conversation::from_new(id, new);
        state.rows.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn find_by_id(&self, id: ConversationId) -> Result<Option<Conversation>, DomainError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .find(|c| c.user_pair() == Some(pair))
            .cloned())
    }

    async fn find_open_support(&self, user: UserId) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .rev()
            .find(|c| {
                c.kind() == ConversationKind::UserToAdmin && c.user() == user && c.is_active()
            })
            .cloned())
    }

    async fn list_for(&self, principal: &Principal) -> Result<Vec<Conversation>, DomainError> {
        let state = self.state.read().await;
        let mut visible: Vec<Conversation> = state
            .rows
            .values()
            .filter(|c| visible_to(c, principal))
            .cloned()
            .collect();
        visible.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(visible)
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&conversation.id()) {
            Some(row) => {
                *row = conversation.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("conversation {} not found", conversation.id()),
            )),
        }
    }

    async fn touch(&self, id: ConversationId, at: Timestamp) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(row) => {
                row.touch(at);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("conversation {} not found", id),
            )),
        }
    }
}
