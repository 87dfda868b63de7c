//! Chat services shared by the realtime session and the REST handlers.
//!
//! - `IdentityResolver` - bearer token to principal
//! - `ConversationDirectory` - find-or-create and the access predicate
//! - `MessageStore` - authorized append/list/read/edit/delete

mod conversation_directory;
mod identity_resolver;
mod message_store;

pub use conversation_directory::ConversationDirectory;
pub use identity_resolver::IdentityResolver;
pub use message_store::MessageStore;
