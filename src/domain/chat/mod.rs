//! Chat domain - conversations, messages and their access rules.
//!
//! - [`Conversation`] - a user-to-user or user-to-admin thread
//! - [`Message`] - an entry in a conversation, ordered by creation time
//! - [`ChatError`] - the failure taxonomy shared by the realtime and REST paths

mod conversation;
mod errors;
mod message;

pub use conversation::{
    Conversation, ConversationKind, Counterpart, NewConversation, UserPair,
};
pub use errors::{ChatError, MissingEntity};
pub use message::{Message, MessageStatus, MessageText, NewMessage, DEFAULT_MAX_MESSAGE_LEN};
