//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! Services hold the chat rules shared by every entry point; handlers are
//! the per-use-case commands (write) and queries (read) built on them.

pub mod handlers;
pub mod services;

pub use handlers::{
    ArchiveConversationCommand, ArchiveConversationHandler, ConversationSummary,
    DeleteMessageCommand, DeleteMessageHandler, EditMessageCommand, EditMessageHandler,
    ListConversationsHandler, ListConversationsQuery, ListMessagesHandler, ListMessagesQuery,
    MarkReadCommand, MarkReadHandler, MessageSource, MessageTarget, SendChatMessageCommand,
    SendChatMessageHandler, SendChatMessageResult,
};
pub use services::{ConversationDirectory, IdentityResolver, MessageStore};
