//! SendChatMessageHandler - Command handler for a realtime send.

use std::sync::Arc;

use crate::application::services::{ConversationDirectory, MessageStore};
use crate::domain::chat::{ChatError, Conversation, Message, MessageText};
use crate::domain::foundation::{ConversationId, Principal, UserId};

/// Where an inbound message should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    /// An existing conversation.
    Conversation(ConversationId),
    /// The user-to-user conversation with this receiver, created on demand.
    Receiver(UserId),
    /// The sender's open support conversation, created on demand.
    Support,
}

/// Command to send a message.
#[derive(Debug, Clone)]
pub struct SendChatMessageCommand {
    pub sender: Principal,
    pub target: MessageTarget,
    pub text: String,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SendChatMessageResult {
    pub conversation: Conversation,
    pub message: Message,
}

/// Handler for sending messages.
pub struct SendChatMessageHandler {
    directory: Arc<ConversationDirectory>,
    store: Arc<MessageStore>,
    max_message_len: usize,
}

impl SendChatMessageHandler {
    pub fn new(
        directory: Arc<ConversationDirectory>,
        store: Arc<MessageStore>,
        max_message_len: usize,
    ) -> Self {
        Self {
            directory,
            store,
            max_message_len,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendChatMessageCommand,
    ) -> Result<SendChatMessageResult, ChatError> {
        // 1. Validate text before touching storage
        let text = MessageText::parse(&cmd.text, self.max_message_len)?;

        // 2. Resolve target conversation
        let conversation = match cmd.target {
            MessageTarget::Conversation(id) => self.directory.authorize(id, &cmd.sender).await?,
            MessageTarget::Receiver(receiver) => {
                self.directory
                    .find_or_create_user_to_user(cmd.sender.user_id, receiver)
                    .await?
            }
            MessageTarget::Support => {
                self.directory
                    .find_or_create_support(cmd.sender.user_id)
                    .await?
            }
        };

        // 3. Persist (access re-checked by the store)
        let message = self.store.append(&conversation, &cmd.sender, text).await?;

        Ok(SendChatMessageResult {
            conversation,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{principal, services};
    use super::*;
    use crate::domain::chat::{ConversationKind, MissingEntity};

    fn handler(s: &super::super::test_support::Services) -> SendChatMessageHandler {
        SendChatMessageHandler::new(s.directory.clone(), s.store.clone(), 20)
    }

    fn command(sender: i64, target: MessageTarget, text: &str) -> SendChatMessageCommand {
        SendChatMessageCommand {
            sender: principal(sender),
            target,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn receiver_target_creates_conversation_and_message() {
        let s = services();

        let result = handler(&s)
            .handle(command(1, MessageTarget::Receiver(UserId::from_raw(2)), "Hi"))
            .await
            .unwrap();

        assert_eq!(result.conversation.kind(), ConversationKind::UserToUser);
        assert_eq!(result.message.sender_id().as_i64(), 1);
        assert_eq!(result.message.conversation_id(), result.conversation.id());
        assert_eq!(s.messages.count().await, 1);
    }

    #[tokio::test]
    async fn invalid_text_creates_nothing() {
        let s = services();

        let err = handler(&s)
            .handle(command(1, MessageTarget::Receiver(UserId::from_raw(2)), "   "))
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Message cannot be empty.");
        assert_eq!(s.conversations.count().await, 0);
    }

    #[tokio::test]
    async fn too_long_text_is_rejected() {
        let s = services();

        let err = handler(&s)
            .handle(command(
                1,
                MessageTarget::Receiver(UserId::from_raw(2)),
                "this message is far too long",
            ))
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Message is too long.");
    }

    #[tokio::test]
    async fn foreign_conversation_is_denied() {
        let s = services();
        let conversation = s
            .directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap();

        let err = handler(&s)
            .handle(command(3, MessageTarget::Conversation(conversation.id()), "Hi"))
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Access denied.");
        assert_eq!(s.messages.count().await, 0);
    }

    #[tokio::test]
    async fn missing_receiver_is_named() {
        let s = services();

        let err = handler(&s)
            .handle(command(1, MessageTarget::Receiver(UserId::from_raw(404)), "Hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::NotFound(MissingEntity::Receiver)));
    }

    #[tokio::test]
    async fn support_target_opens_support_conversation() {
        let s = services();

        let result = handler(&s)
            .handle(command(1, MessageTarget::Support, "Need help"))
            .await
            .unwrap();

        assert_eq!(result.conversation.kind(), ConversationKind::UserToAdmin);
        assert_eq!(result.conversation.user().as_i64(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_is_generic() {
        let s = services();
        s.messages.set_fail_appends(true);

        let err = handler(&s)
            .handle(command(1, MessageTarget::Receiver(UserId::from_raw(2)), "Hi"))
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Failed to send message.");
    }
}
