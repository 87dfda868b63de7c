//! Chat command and query handlers.

mod archive_conversation;
mod delete_message;
mod edit_message;
mod list_conversations;
mod list_messages;
mod mark_read;
mod send_chat_message;

#[cfg(test)]
mod test_support;

pub use archive_conversation::{ArchiveConversationCommand, ArchiveConversationHandler};
pub use delete_message::{DeleteMessageCommand, DeleteMessageHandler};
pub use edit_message::{EditMessageCommand, EditMessageHandler};
pub use list_conversations::{
    ConversationSummary, ListConversationsHandler, ListConversationsQuery,
};
pub use list_messages::{ListMessagesHandler, ListMessagesQuery, MessageSource};
pub use mark_read::{MarkReadCommand, MarkReadHandler};
pub use send_chat_message::{
    MessageTarget, SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
