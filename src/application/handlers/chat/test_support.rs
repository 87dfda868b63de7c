//! Shared wiring for handler tests.

use std::sync::Arc;

use crate::adapters::memory::{
    InMemoryConversationRepository, InMemoryMessageRepository, InMemoryUserDirectory,
};
use crate::application::services::{ConversationDirectory, MessageStore};
use crate::domain::foundation::{Principal, UserId};

pub(super) struct Services {
    pub users: Arc<InMemoryUserDirectory>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub directory: Arc<ConversationDirectory>,
    pub store: Arc<MessageStore>,
}

/// Users 1-3 are regular, 9 is an admin.
pub(super) fn services() -> Services {
    let users = Arc::new(
        InMemoryUserDirectory::new()
            .with_test_user(1, false)
            .with_test_user(2, false)
            .with_test_user(3, false)
            .with_test_user(9, true),
    );
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let directory = Arc::new(ConversationDirectory::new(
        conversations.clone(),
        users.clone(),
    ));
    let store = Arc::new(MessageStore::new(
        directory.clone(),
        conversations.clone(),
        messages.clone(),
    ));
    Services {
        users,
        conversations,
        messages,
        directory,
        store,
    }
}

pub(super) fn principal(id: i64) -> Principal {
    Principal::new(UserId::from_raw(id), format!("User {}", id), id == 9)
}
