//! Conversation repository port.
//!
//! Defines the contract for persisting and retrieving conversations.
//!
//! # Design
//!
//! - **Pair-unique**: at most one user-to-user conversation per unordered
//!   pair of users; implementations enforce this and report a duplicate
//!   insert as `ErrorCode::Conflict`
//! - **Never deleted**: conversations are archived or deactivated via flags

use async_trait::async_trait;

use crate::domain::chat::{Conversation, NewConversation, UserPair};
use crate::domain::foundation::{ConversationId, DomainError, Principal, Timestamp, UserId};

/// Repository port for conversations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Insert a new conversation and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a user-to-user conversation already exists for the pair
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, new: NewConversation) -> Result<Conversation, DomainError>;

    /// Find a conversation by id.
    async fn find_by_id(&self, id: ConversationId) -> Result<Option<Conversation>, DomainError>;

    /// Find the user-to-user conversation for a pair, in either direction.
    async fn find_by_pair(&self, pair: UserPair) -> Result<Option<Conversation>, DomainError>;

    /// Find the most recent active user-to-admin conversation opened by `user`.
    async fn find_open_support(&self, user: UserId) -> Result<Option<Conversation>, DomainError>;

    /// Conversations visible to the principal, most recently updated first.
    ///
    /// Users see conversations where they are the primary or second user, or
    /// the assigned admin. Admins additionally see every user-to-admin
    /// conversation.
    async fn list_for(&self, principal: &Principal) -> Result<Vec<Conversation>, DomainError>;

    /// Persist flag changes (archived, active) and `updated_at`.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation doesn't exist
    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError>;

    /// Move `updated_at` forward to `at` (never backwards).
    async fn touch(&self, id: ConversationId, at: Timestamp) -> Result<(), DomainError>;
}
