//! Message entity, text value object and edit/delete rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ConversationId, MessageId, Principal, Timestamp, UserId, ValidationError,
};

use super::{Conversation, ConversationKind};

/// Upper bound on message text, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4000;

/// Validated, non-blank message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// Rejects blank text and enforces the length limit. The text is kept
    /// exactly as sent; the limit applies to the stored characters.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        if raw.chars().count() > max_len {
            return Err(ValidationError::too_long("message", max_len));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Lifecycle of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Active,
    Edited,
    Deleted,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Active => "active",
            MessageStatus::Edited => "edited",
            MessageStatus::Deleted => "deleted",
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, MessageStatus::Deleted)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MessageStatus::Active),
            "edited" => Ok(MessageStatus::Edited),
            "deleted" => Ok(MessageStatus::Deleted),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown message status '{}'", other),
            )),
        }
    }
}

/// Data required to append a message; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: MessageText,
}

/// A message in a conversation.
///
/// Ordering within a conversation is `(created_at, id)` ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    conversation_id: ConversationId,
    sender_id: UserId,
    content: Option<String>,
    attachment: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    is_read: bool,
    status: MessageStatus,
}

impl Message {
    /// Materializes a freshly appended message.
    pub fn from_new(id: MessageId, new: NewMessage, created_at: Timestamp) -> Self {
        Self {
            id,
            conversation_id: new.conversation_id,
            sender_id: new.sender_id,
            content: Some(new.content.into_inner()),
            attachment: None,
            created_at,
            updated_at: created_at,
            is_read: false,
            status: MessageStatus::Active,
        }
    }

    /// Reconstitutes a message from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MessageId,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: Option<String>,
        attachment: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
        is_read: bool,
        status: MessageStatus,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            attachment,
            created_at,
            updated_at,
            is_read,
            status,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Stored content, including the text of deleted messages.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Content as shown to readers; deleted messages show nothing.
    pub fn visible_content(&self) -> Option<&str> {
        if self.status.is_deleted() {
            None
        } else {
            self.content.as_deref()
        }
    }

    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn is_edited(&self) -> bool {
        self.status == MessageStatus::Edited
    }

    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }

    // === Rules ===

    /// Only the sender may edit, and never after deletion.
    pub fn can_edit(&self, principal: &Principal) -> bool {
        principal.user_id == self.sender_id && !self.status.is_deleted()
    }

    /// The sender may delete; admins may also delete on support conversations.
    pub fn can_delete(&self, principal: &Principal, conversation: &Conversation) -> bool {
        principal.user_id == self.sender_id
            || (conversation.kind() == ConversationKind::UserToAdmin && principal.is_admin)
    }

    // === Mutations ===

    /// Flips the read flag. Returns `false` when it was already set.
    pub fn mark_read(&mut self) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        true
    }

    /// Replaces the body and moves the status to `Edited`.
    pub fn edit(&mut self, text: MessageText) {
        self.content = Some(text.into_inner());
        self.status = MessageStatus::Edited;
        self.updated_at = Timestamp::now().at_least(self.created_at);
    }

    /// Soft-deletes the message. Returns `false` when already deleted.
    pub fn delete(&mut self) -> bool {
        if self.status.is_deleted() {
            return false;
        }
        self.status = MessageStatus::Deleted;
        self.updated_at = Timestamp::now().at_least(self.created_at);
        true
    }
}
