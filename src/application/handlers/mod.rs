//! Application handlers.
//!
//! Command and query handlers that orchestrate the chat services.

pub mod chat;

pub use chat::{
    ArchiveConversationCommand, ArchiveConversationHandler, ConversationSummary,
    DeleteMessageCommand, DeleteMessageHandler, EditMessageCommand, EditMessageHandler,
    ListConversationsHandler, ListConversationsQuery, ListMessagesHandler, ListMessagesQuery,
    MarkReadCommand, MarkReadHandler, MessageSource, MessageTarget, SendChatMessageCommand,
    SendChatMessageHandler, SendChatMessageResult,
};
