//! MarkReadHandler - Command handler for read receipts.

use std::sync::Arc;

use crate::application::services::MessageStore;
use crate::domain::chat::{ChatError, Message};
use crate::domain::foundation::{MessageId, Principal};

#[derive(Debug, Clone)]
pub struct MarkReadCommand {
    pub reader: Principal,
    pub message_id: MessageId,
}

pub struct MarkReadHandler {
    store: Arc<MessageStore>,
}

impl MarkReadHandler {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: MarkReadCommand) -> Result<Message, ChatError> {
        self.store.mark_read(cmd.message_id, &cmd.reader).await
    }
}
