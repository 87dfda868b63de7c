//! ListMessagesHandler - Query handler for conversation history.

use std::sync::Arc;

use crate::application::services::MessageStore;
use crate::domain::chat::ChatError;
use crate::domain::foundation::{ConversationId, Principal, UserId};
use crate::ports::{MessagePage, PageRequest};

/// Which history to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Conversation(ConversationId),
    /// The user-to-user conversation with this counterpart.
    Counterpart(UserId),
}

#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub principal: Principal,
    pub source: MessageSource,
    pub page: PageRequest,
}

pub struct ListMessagesHandler {
    store: Arc<MessageStore>,
}

impl ListMessagesHandler {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListMessagesQuery) -> Result<MessagePage, ChatError> {
        match query.source {
            MessageSource::Conversation(id) => {
                self.store.list(id, &query.principal, query.page).await
            }
            MessageSource::Counterpart(user) => {
                self.store.list_with(&query.principal, user, query.page).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{principal, services};
    use super::*;
    use crate::domain::chat::MessageText;

    #[tokio::test]
    async fn both_sources_read_the_same_history() {
        let s = services();
        let conversation = s
            .directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap();
        s.store
            .append(&conversation, &principal(1), MessageText::parse("Hi", 50).unwrap())
            .await
            .unwrap();
        let handler = ListMessagesHandler::new(s.store.clone());

        let by_id = handler
            .handle(ListMessagesQuery {
                principal: principal(2),
                source: MessageSource::Conversation(conversation.id()),
                page: PageRequest::first(),
            })
            .await
            .unwrap();
        let by_user = handler
            .handle(ListMessagesQuery {
                principal: principal(2),
                source: MessageSource::Counterpart(UserId::from_raw(1)),
                page: PageRequest::first(),
            })
            .await
            .unwrap();

        assert_eq!(by_id.messages.len(), 1);
        assert_eq!(by_id, by_user);
    }

    #[tokio::test]
    async fn outsider_is_denied() {
        let s = services();
        let conversation = s
            .directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap();

        let err = ListMessagesHandler::new(s.store.clone())
            .handle(ListMessagesQuery {
                principal: principal(3),
                source: MessageSource::Conversation(conversation.id()),
                page: PageRequest::first(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::AccessDenied));
    }
}
