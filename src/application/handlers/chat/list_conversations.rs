//! ListConversationsHandler - Query handler for a principal's inbox.

use std::sync::Arc;

use crate::application::services::{ConversationDirectory, MessageStore};
use crate::domain::chat::{ChatError, Conversation, Message};
use crate::domain::foundation::Principal;
use crate::ports::{UserDirectory, UserRecord};

/// Query for the conversations visible to a principal.
#[derive(Debug, Clone)]
pub struct ListConversationsQuery {
    pub principal: Principal,
}

/// A conversation with what an inbox row needs to render.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    /// The other party as seen by the viewer; `None` for unassigned support.
    pub counterpart: Option<UserRecord>,
    pub last_message: Option<Message>,
}

pub struct ListConversationsHandler {
    directory: Arc<ConversationDirectory>,
    store: Arc<MessageStore>,
    users: Arc<dyn UserDirectory>,
}

impl ListConversationsHandler {
    pub fn new(
        directory: Arc<ConversationDirectory>,
        store: Arc<MessageStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            directory,
            store,
            users,
        }
    }

    pub async fn handle(
        &self,
        query: ListConversationsQuery,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        let conversations = self.directory.list_for(&query.principal).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let counterpart = match conversation.counterpart_of(query.principal.user_id) {
                Some(id) => self.users.find_by_id(id).await?,
                None => None,
            };
            let last_message = self.store.last_in(conversation.id()).await?;
            summaries.push(ConversationSummary {
                conversation,
                counterpart,
                last_message,
            });
        }

        Ok(summaries)
    }
}
