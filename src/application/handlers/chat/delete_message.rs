//! DeleteMessageHandler - Command handler for soft deletion.

use std::sync::Arc;

use crate::application::services::MessageStore;
use crate::domain::chat::{ChatError, Message};
use crate::domain::foundation::{MessageId, Principal};

#[derive(Debug, Clone)]
pub struct DeleteMessageCommand {
    pub actor: Principal,
    pub message_id: MessageId,
}

pub struct DeleteMessageHandler {
    store: Arc<MessageStore>,
}

impl DeleteMessageHandler {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: DeleteMessageCommand) -> Result<Message, ChatError> {
        self.store.delete(cmd.message_id, &cmd.actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{principal, services};
    use super::*;
    use crate::domain::chat::MessageText;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn recipient_cannot_delete_but_sender_can() {
        let s = services();
        let conversation = s
            .directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap();
        let message = s
            .store
            .append(&conversation, &principal(1), MessageText::parse("Hi", 50).unwrap())
            .await
            .unwrap();
        let handler = DeleteMessageHandler::new(s.store.clone());

        let denied = handler
            .handle(DeleteMessageCommand {
                actor: principal(2),
                message_id: message.id(),
            })
            .await
            .unwrap_err();
        let deleted = handler
            .handle(DeleteMessageCommand {
                actor: principal(1),
                message_id: message.id(),
            })
            .await
            .unwrap();

        assert!(matches!(denied, ChatError::AccessDenied));
        assert!(deleted.is_deleted());
        assert_eq!(deleted.visible_content(), None);
    }
}
