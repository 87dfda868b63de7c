//! In-memory adapters for tests and local development.
//!
//! Each adapter mirrors the semantics of its PostgreSQL counterpart,
//! including pair uniqueness and monotonic message timestamps.

mod conversation_repository;
mod message_repository;
mod user_directory;

pub use conversation_repository::InMemoryConversationRepository;
pub use message_repository::InMemoryMessageRepository;
pub use user_directory::InMemoryUserDirectory;
