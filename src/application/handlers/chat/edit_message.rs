//! EditMessageHandler - Command handler for editing message text.

use std::sync::Arc;

use crate::application::services::MessageStore;
use crate::domain::chat::{ChatError, Message, MessageText};
use crate::domain::foundation::{MessageId, Principal};

#[derive(Debug, Clone)]
pub struct EditMessageCommand {
    pub editor: Principal,
    pub message_id: MessageId,
    pub text: String,
}

pub struct EditMessageHandler {
    store: Arc<MessageStore>,
    max_message_len: usize,
}

impl EditMessageHandler {
    pub fn new(store: Arc<MessageStore>, max_message_len: usize) -> Self {
        Self {
            store,
            max_message_len,
        }
    }

    pub async fn handle(&self, cmd: EditMessageCommand) -> Result<Message, ChatError> {
        let text = MessageText::parse(&cmd.text, self.max_message_len)?;
        self.store.edit(cmd.message_id, &cmd.editor, text).await
    }
}
