//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the chat domain.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, Principal};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConversationId, MessageId, UserId};
pub use timestamp::Timestamp;
