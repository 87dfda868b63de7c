//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the chat core and the outside world. Adapters implement these ports.
//!
//! ## Identity Ports
//!
//! - `SessionValidator` - Bearer token to principal
//! - `UserDirectory` - Read access to marketplace users
//!
//! ## Persistence Ports
//!
//! - `ConversationRepository` - Conversations and the pair-uniqueness rule
//! - `MessageRepository` - Append-only, keyset-paged message log

mod conversation_repository;
mod message_repository;
mod session_validator;
mod user_directory;

pub use conversation_repository::ConversationRepository;
pub use message_repository::{
    MessagePage, MessageRepository, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use session_validator::SessionValidator;
pub use user_directory::{UserDirectory, UserRecord};
