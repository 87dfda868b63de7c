//! WebSocket protocol types for realtime chat.
//!
//! Client → Server: a JSON object naming a target and the text to send.
//! Server → Client: either a message frame or `{"error": "..."}`.

use serde::{Deserialize, Serialize};

use crate::application::MessageTarget;
use crate::domain::chat::Message;
use crate::domain::foundation::{
    ConversationId, MessageId, Principal, UserId, ValidationError,
};

// ============================================
// Client → Server Messages
// ============================================

/// Identifier as sent by clients, which use both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Int(i64),
    Text(String),
}

impl IdRef {
    fn to_i64(&self, field: &str) -> Result<i64, ValidationError> {
        let raw = match self {
            IdRef::Int(n) => *n,
            IdRef::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ValidationError::invalid_format(field, "not an integer"))?,
        };
        if raw <= 0 {
            return Err(ValidationError::invalid_format(field, "must be positive"));
        }
        Ok(raw)
    }
}

/// Raw inbound event, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundPayload {
    #[serde(default)]
    pub conversation_id: Option<IdRef>,
    #[serde(default)]
    pub receiver_id: Option<IdRef>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub to_admin: Option<bool>,
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    SendMessage { target: MessageTarget, text: String },
}

impl InboundPayload {
    /// Parses a text frame. Anything that is not a JSON object of the
    /// expected shape is an invalid payload.
    pub fn parse(frame: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(frame)
            .map_err(|e| ValidationError::invalid_format("payload", e.to_string()))
    }

    /// Resolves the target: `conversation_id`, then `receiver_id`, then
    /// `to_admin`.
    pub fn into_command(self) -> Result<ClientCommand, ValidationError> {
        let target = match (&self.conversation_id, &self.receiver_id) {
            (Some(id), _) => {
                MessageTarget::Conversation(ConversationId::from_raw(id.to_i64("conversation_id")?))
            }
            (None, Some(id)) => MessageTarget::Receiver(UserId::from_raw(id.to_i64("receiver_id")?)),
            (None, None) if self.to_admin == Some(true) => MessageTarget::Support,
            (None, None) => {
                return Err(ValidationError::invalid_format(
                    "target",
                    "conversation_id, receiver_id or to_admin required",
                ))
            }
        };

        let text = self.message.ok_or_else(|| ValidationError::empty_field("message"))?;

        Ok(ClientCommand::SendMessage { target, text })
    }
}

// ============================================
// Server → Client Messages
// ============================================

/// Everything the server pushes down a chat connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerEvent {
    Message(ChatMessageFrame),
    Error(ErrorFrame),
}

impl ServerEvent {
    pub fn error(text: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorFrame { error: text.into() })
    }

    pub fn message(sender: &Principal, message: &Message) -> Self {
        ServerEvent::Message(ChatMessageFrame::new(sender, message))
    }

    /// Serializes to the JSON text sent over the socket.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A persisted message fanned out to a conversation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageFrame {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    /// Sender display name.
    pub sender: String,
    pub sender_id: UserId,
    pub message: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl ChatMessageFrame {
    pub fn new(sender: &Principal, message: &Message) -> Self {
        Self {
            conversation_id: message.conversation_id(),
            message_id: message.id(),
            sender: sender.display_name.clone(),
            sender_id: message.sender_id(),
            message: message.visible_content().unwrap_or_default().to_string(),
            timestamp: message.created_at().to_rfc3339(),
        }
    }
}

/// Reply sent only to the connection whose event failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
}
