//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, principals, errors)
//! - `chat` - Conversations, messages and their access rules

pub mod chat;
pub mod foundation;
