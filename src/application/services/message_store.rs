//! MessageStore - Authorized access to the per-conversation message log.

use std::sync::Arc;

use crate::domain::chat::{
    ChatError, Conversation, Message, MessageText, MissingEntity, NewMessage,
};
use crate::domain::foundation::{ConversationId, MessageId, Principal, UserId};
use crate::ports::{ConversationRepository, MessagePage, MessageRepository, PageRequest};

use super::ConversationDirectory;

/// Appends, lists and mutates messages after checking conversation access.
pub struct MessageStore {
    directory: Arc<ConversationDirectory>,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl MessageStore {
    pub fn new(
        directory: Arc<ConversationDirectory>,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            directory,
            conversations,
            messages,
        }
    }

    /// Persists a message from `sender` into `conversation`.
    ///
    /// The conversation's `updated_at` is bumped afterwards; a failure to do
    /// so is logged and does not fail the append, which is already durable.
    pub async fn append(
        &self,
        conversation: &Conversation,
        sender: &Principal,
        text: MessageText,
    ) -> Result<Message, ChatError> {
        if !self.directory.can_access(conversation, sender) {
            return Err(ChatError::AccessDenied);
        }
        if !conversation.is_active() {
            return Err(ChatError::Inactive);
        }

        let message = self
            .messages
            .append(NewMessage {
                conversation_id: conversation.id(),
                sender_id: sender.user_id,
                content: text,
            })
            .await?;

        if let Err(e) = self
            .conversations
            .touch(conversation.id(), message.created_at())
            .await
        {
            tracing::warn!(
                conversation_id = %conversation.id(),
                error = %e,
                "Failed to bump conversation activity"
            );
        }

        Ok(message)
    }

    /// One page of a conversation's history, ascending.
    pub async fn list(
        &self,
        conversation: ConversationId,
        reader: &Principal,
        page: PageRequest,
    ) -> Result<MessagePage, ChatError> {
        self.directory.authorize(conversation, reader).await?;
        Ok(self.messages.list(conversation, page).await?)
    }

    /// History with a specific counterpart; empty when they never talked.
    pub async fn list_with(
        &self,
        reader: &Principal,
        counterpart: UserId,
        page: PageRequest,
    ) -> Result<MessagePage, ChatError> {
        match self.directory.conversation_with(reader, counterpart).await? {
            Some(conversation) => Ok(self.messages.list(conversation.id(), page).await?),
            None => Ok(MessagePage::empty()),
        }
    }

    pub async fn last_in(&self, conversation: ConversationId) -> Result<Option<Message>, ChatError> {
        Ok(self.messages.last_in(conversation).await?)
    }

    /// Marks a message read on behalf of `reader`.
    ///
    /// Idempotent. The sender reading their own message changes nothing.
    pub async fn mark_read(&self, id: MessageId, reader: &Principal) -> Result<Message, ChatError> {
        let (mut message, _) = self.load_authorized(id, reader).await?;

        if message.sender_id() != reader.user_id && message.mark_read() {
            self.messages.update(&message).await?;
        }
        Ok(message)
    }

    /// Replaces the text of a message. Only the sender may edit.
    pub async fn edit(
        &self,
        id: MessageId,
        editor: &Principal,
        text: MessageText,
    ) -> Result<Message, ChatError> {
        let (mut message, _) = self.load_authorized(id, editor).await?;
        if !message.can_edit(editor) {
            return Err(ChatError::AccessDenied);
        }

        message.edit(text);
        self.messages.update(&message).await?;
        tracing::debug!(message_id = %id, user_id = %editor.user_id, "Message edited");
        Ok(message)
    }

    /// Soft-deletes a message.
    pub async fn delete(&self, id: MessageId, actor: &Principal) -> Result<Message, ChatError> {
        let (mut message, conversation) = self.load_authorized(id, actor).await?;
        if !message.can_delete(actor, &conversation) {
            return Err(ChatError::AccessDenied);
        }

        if message.delete() {
            self.messages.update(&message).await?;
            tracing::debug!(message_id = %id, user_id = %actor.user_id, "Message deleted");
        }
        Ok(message)
    }

    async fn load_authorized(
        &self,
        id: MessageId,
        principal: &Principal,
    ) -> Result<(Message, Conversation), ChatError> {
        let message = self
            .messages
            .find_by_id(id)
            .await?
            .ok_or(ChatError::NotFound(MissingEntity::Message))?;
        let conversation = self
            .directory
            .authorize(message.conversation_id(), principal)
            .await?;
        Ok((message, conversation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryConversationRepository, InMemoryMessageRepository, InMemoryUserDirectory,
    };
    use crate::domain::chat::MessageStatus;

    struct Fixture {
        store: MessageStore,
        directory: Arc<ConversationDirectory>,
        conversations: Arc<InMemoryConversationRepository>,
        messages: Arc<InMemoryMessageRepository>,
    }

    fn fixture() -> Fixture {
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let users = InMemoryUserDirectory::new()
            .with_test_user(1, false)
            .with_test_user(2, false)
            .with_test_user(3, false)
            .with_test_user(9, true);
        let directory = Arc::new(ConversationDirectory::new(
            conversations.clone(),
            Arc::new(users),
        ));
        let store = MessageStore::new(directory.clone(), conversations.clone(), messages.clone());
        Fixture {
            store,
            directory,
            conversations,
            messages,
        }
    }

    fn user(id: i64) -> Principal {
        Principal::new(UserId::from_raw(id), format!("User {}", id), false)
    }

    fn admin(id: i64) -> Principal {
        Principal::new(UserId::from_raw(id), format!("Admin {}", id), true)
    }

    fn text(s: &str) -> MessageText {
        MessageText::parse(s, 100).unwrap()
    }

    async fn direct(f: &Fixture) -> Conversation {
        f.directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn append_persists_and_bumps_activity() {
        let f = fixture();
        let conversation = direct(&f).await;

        let message = f.store.append(&conversation, &user(1), text("Hi")).await.unwrap();

        assert_eq!(message.content(), Some("Hi"));
        let stored = f.conversations.find_by_id(conversation.id()).await.unwrap().unwrap();
        assert!(stored.updated_at() >= message.created_at());
    }

    #[tokio::test]
    async fn outsider_append_persists_nothing() {
        let f = fixture();
        let conversation = direct(&f).await;

        let err = f.store.append(&conversation, &user(3), text("Hi")).await.unwrap_err();

        assert!(matches!(err, ChatError::AccessDenied));
        assert_eq!(f.messages.count().await, 0);
    }

    #[tokio::test]
    async fn inactive_conversation_rejects_appends() {
        let f = fixture();
        let mut conversation = direct(&f).await;
        conversation.deactivate();

        let err = f.store.append(&conversation, &user(1), text("Hi")).await.unwrap_err();

        assert!(matches!(err, ChatError::Inactive));
    }

    #[tokio::test]
    async fn list_is_ordered_and_repeatable() {
        let f = fixture();
        let conversation = direct(&f).await;
        for body in ["one", "two", "three"] {
            f.store.append(&conversation, &user(1), text(body)).await.unwrap();
        }

        let first = f.store.list(conversation.id(), &user(2), PageRequest::first()).await.unwrap();
        let again = f.store.list(conversation.id(), &user(2), PageRequest::first()).await.unwrap();

        let bodies: Vec<_> = first.messages.iter().filter_map(Message::content).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn list_with_counterpart_without_history_is_empty() {
        let f = fixture();

        let page = f
            .store
            .list_with(&user(1), UserId::from_raw(3), PageRequest::first())
            .await
            .unwrap();

        assert!(page.messages.is_empty());
    }

    #[tokio::test]
    async fn mark_read_only_changes_for_recipient() {
        let f = fixture();
        let conversation = direct(&f).await;
        let message = f.store.append(&conversation, &user(1), text("Hi")).await.unwrap();

        let by_sender = f.store.mark_read(message.id(), &user(1)).await.unwrap();
        assert!(!by_sender.is_read());

        let by_recipient = f.store.mark_read(message.id(), &user(2)).await.unwrap();
        let twice = f.store.mark_read(message.id(), &user(2)).await.unwrap();
        assert!(by_recipient.is_read());
        assert!(twice.is_read());
    }

    #[tokio::test]
    async fn edit_is_limited_to_sender() {
        let f = fixture();
        let conversation = direct(&f).await;
        let message = f.store.append(&conversation, &user(1), text("Hi")).await.unwrap();

        let err = f.store.edit(message.id(), &user(2), text("Hacked")).await.unwrap_err();
        assert!(matches!(err, ChatError::AccessDenied));

        let edited = f.store.edit(message.id(), &user(1), text("Hello")).await.unwrap();
        assert_eq!(edited.status(), MessageStatus::Edited);
        assert_eq!(edited.content(), Some("Hello"));
    }

    #[tokio::test]
    async fn admin_can_delete_in_support_conversation() {
        let f = fixture();
        let support = f
            .directory
            .find_or_create_support(UserId::from_raw(1))
            .await
            .unwrap();
        let message = f.store.append(&support, &user(1), text("Help")).await.unwrap();

        let deleted = f.store.delete(message.id(), &admin(9)).await.unwrap();

        assert!(deleted.is_deleted());
        let page = f.store.list(support.id(), &user(1), PageRequest::first()).await.unwrap();
        assert_eq!(page.messages[0].visible_content(), None);
    }

    #[tokio::test]
    async fn unknown_message_is_not_found() {
        let f = fixture();

        let err = f
            .store
            .mark_read(MessageId::from_raw(77), &user(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::NotFound(MissingEntity::Message)));
    }
}
