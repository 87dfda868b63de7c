//! ArchiveConversationHandler - Command handler for archiving conversations.

use std::sync::Arc;

use crate::application::services::ConversationDirectory;
use crate::domain::chat::{ChatError, Conversation};
use crate::domain::foundation::{ConversationId, Principal};

#[derive(Debug, Clone)]
pub struct ArchiveConversationCommand {
    pub principal: Principal,
    pub conversation_id: ConversationId,
}

pub struct ArchiveConversationHandler {
    directory: Arc<ConversationDirectory>,
}

impl ArchiveConversationHandler {
    pub fn new(directory: Arc<ConversationDirectory>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, cmd: ArchiveConversationCommand) -> Result<Conversation, ChatError> {
        let conversation = self
            .directory
            .archive(cmd.conversation_id, &cmd.principal)
            .await?;
        tracing::info!(
            conversation_id = %cmd.conversation_id,
            user_id = %cmd.principal.user_id,
            "Conversation archived"
        );
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{principal, services};
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::ports::ConversationRepository;

    #[tokio::test]
    async fn participant_archives_and_flag_is_stored() {
        let s = services();
        let conversation = s
            .directory
            .find_or_create_user_to_user(UserId::from_raw(1), UserId::from_raw(2))
            .await
            .unwrap();

        let archived = ArchiveConversationHandler::new(s.directory.clone())
            .handle(ArchiveConversationCommand {
                principal: principal(2),
                conversation_id: conversation.id(),
            })
            .await
            .unwrap();

        assert!(archived.is_archived());
        assert!(s
            .conversations
            .find_by_id(conversation.id())
            .await
            .unwrap()
            .unwrap()
            .is_archived());
    }
}
