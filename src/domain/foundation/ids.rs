//! Strongly-typed identifier value objects.
//!
//! Users, conversations and messages are relational rows with integer
//! surrogate keys, so every identifier wraps an `i64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Identifier of a marketplace user (owned by the user directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId, rejecting non-positive values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format("user_id", "must be positive"));
        }
        Ok(Self(id))
    }

    /// Wraps a value read back from storage without validation.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format("user_id", "not an integer"))?;
        Self::new(id)
    }
}

/// Identifier of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Creates a ConversationId, rejecting non-positive values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format(
                "conversation_id",
                "must be positive",
            ));
        }
        Ok(Self(id))
    }

    /// Wraps a value read back from storage without validation.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format("conversation_id", "not an integer"))?;
        Self::new(id)
    }
}

/// Identifier of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    /// Creates a MessageId, rejecting non-positive values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format("message_id", "must be positive"));
        }
        Ok(Self(id))
    }

    /// Wraps a value read back from storage without validation.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format("message_id", "not an integer"))?;
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_zero_and_negative() {
        assert!(UserId::new(0).is_err());
        assert!(UserId::new(-4).is_err());
        assert_eq!(UserId::new(7).unwrap().as_i64(), 7);
    }

    #[test]
    fn conversation_id_parses_from_string() {
        let id: ConversationId = " 42 ".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
        assert!("abc".parse::<ConversationId>().is_err());
        assert!("0".parse::<ConversationId>().is_err());
    }

    #[test]
    fn message_id_display_is_plain_integer() {
        assert_eq!(MessageId::from_raw(15).to_string(), "15");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&UserId::from_raw(3)).unwrap();
        assert_eq!(json, "3");

        let id: ConversationId = serde_json::from_str("9").unwrap();
        assert_eq!(id, ConversationId::from_raw(9));
    }
}
