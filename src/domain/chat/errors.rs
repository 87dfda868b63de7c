//! Error taxonomy for chat operations.
//!
//! Per-event failures are converted to a `{"error": ...}` reply for the
//! originating connection via [`ChatError::client_message`]; only
//! `AuthenticationRejected` ever closes a connection.

use thiserror::Error;

use crate::domain::foundation::{AuthError, DomainError, ErrorCode, ValidationError};

/// Entity named by a `NotFound` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    Receiver,
    Conversation,
    Message,
}

/// Errors surfaced by the conversation directory, message store and the
/// realtime session.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// No, invalid or expired credential at connection time.
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(#[from] AuthError),

    /// The principal may not use the target conversation or message.
    #[error("Access denied")]
    AccessDenied,

    /// A referenced entity does not exist.
    #[error("{0:?} not found")]
    NotFound(MissingEntity),

    /// The inbound payload or text failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The conversation has been deactivated.
    #[error("Conversation is not active")]
    Inactive,

    /// Storage failed; details stay server-side.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl ChatError {
    /// Human-readable text for the error frame sent to the client.
    ///
    /// Unknown conversations and forbidden ones share the same text so the
    /// reply does not reveal whether a conversation id exists.
    pub fn client_message(&self) -> String {
        match self {
            ChatError::AuthenticationRejected(auth) if auth.is_transient() => {
                "Authentication service unavailable.".to_string()
            }
            ChatError::AuthenticationRejected(_) => "Authentication failed.".to_string(),
            ChatError::AccessDenied | ChatError::NotFound(MissingEntity::Conversation) => {
                "Access denied.".to_string()
            }
            ChatError::NotFound(MissingEntity::Receiver) => "Receiver not found.".to_string(),
            ChatError::NotFound(MissingEntity::Message) => "Message not found.".to_string(),
            ChatError::Validation(ValidationError::EmptyField { .. }) => {
                "Message cannot be empty.".to_string()
            }
            ChatError::Validation(ValidationError::TooLong { .. }) => {
                "Message is too long.".to_string()
            }
            ChatError::Validation(ValidationError::SelfReference { .. }) => {
                "Cannot start a conversation with yourself.".to_string()
            }
            ChatError::Validation(_) => "Invalid message payload.".to_string(),
            ChatError::Inactive => "Conversation is not active.".to_string(),
            ChatError::Persistence(_) => "Failed to send message.".to_string(),
        }
    }

    /// Stable code used in REST error bodies and logs.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::AuthenticationRejected(_) => ErrorCode::Unauthorized,
            ChatError::AccessDenied | ChatError::NotFound(MissingEntity::Conversation) => {
                ErrorCode::Forbidden
            }
            ChatError::NotFound(MissingEntity::Receiver) => ErrorCode::UserNotFound,
            ChatError::NotFound(MissingEntity::Message) => ErrorCode::MessageNotFound,
            ChatError::Validation(_) => ErrorCode::ValidationFailed,
            ChatError::Inactive => ErrorCode::ConversationInactive,
            ChatError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for ChatError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => ChatError::Validation(ValidationError::invalid_format(
                "payload",
                err.message,
            )),
            _ => ChatError::Persistence(err.to_string()),
        }
    }
}
