//! HTTP DTOs (Data Transfer Objects) for chat endpoints.
//!
//! Successful responses are wrapped as
//! `{"status": "success", "message": ..., "data": ...}`.

use serde::{Deserialize, Serialize};

use crate::application::ConversationSummary;
use crate::domain::chat::{Conversation, ConversationKind, Message, MessageStatus};
use crate::domain::foundation::{ConversationId, MessageId, UserId};
use crate::ports::{MessagePage, PageRequest, UserRecord};

// ════════════════════════════════════════════════════════════════════════════════
// Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Success envelope shared by every chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

/// Error body for chat endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Error code for programmatic handling.
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            code: code.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Keyset paging parameters: `?after=<message id>&limit=<n>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub after: Option<i64>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn into_page(self) -> PageRequest {
        PageRequest::new(self.after.map(MessageId::from_raw), self.limit)
    }
}

/// Request to replace a message's text.
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: ConversationId,
    pub conversation_type: ConversationKind,
    pub user_id: UserId,
    pub other_user_id: Option<UserId>,
    pub admin_user_id: Option<UserId>,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
    pub is_archived: bool,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id(),
            conversation_type: conversation.kind(),
            user_id: conversation.user(),
            other_user_id: conversation.other_user(),
            admin_user_id: conversation.admin_user(),
            title: conversation.title().map(str::to_owned),
            created_at: conversation.created_at().to_rfc3339(),
            updated_at: conversation.updated_at().to_rfc3339(),
            is_active: conversation.is_active(),
            is_archived: conversation.is_archived(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummaryResponse {
    pub id: UserId,
    pub full_name: String,
    pub is_admin: bool,
}

impl From<&UserRecord> for UserSummaryResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.display_name().to_string(),
            is_admin: user.is_admin(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    /// `null` once deleted.
    pub content: Option<String>,
    pub attachment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_read: bool,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub status: MessageStatus,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            conversation_id: message.conversation_id(),
            sender_id: message.sender_id(),
            content: message.visible_content().map(str::to_owned),
            attachment: message.attachment().map(str::to_owned),
            created_at: message.created_at().to_rfc3339(),
            updated_at: message.updated_at().to_rfc3339(),
            is_read: message.is_read(),
            is_edited: message.is_edited(),
            is_deleted: message.is_deleted(),
            status: message.status(),
        }
    }
}

/// A conversation as an inbox row.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummaryResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub counterpart: Option<UserSummaryResponse>,
    pub last_message: Option<MessageResponse>,
}

impl From<&ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: &ConversationSummary) -> Self {
        Self {
            conversation: ConversationResponse::from(&summary.conversation),
            counterpart: summary.counterpart.as_ref().map(UserSummaryResponse::from),
            last_message: summary.last_message.as_ref().map(MessageResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePageResponse {
    pub messages: Vec<MessageResponse>,
    /// Pass as `after` to fetch the next page; `null` on the last page.
    pub next_cursor: Option<MessageId>,
}

impl From<&MessagePage> for MessagePageResponse {
    fn from(page: &MessagePage) -> Self {
        Self {
            messages: page.messages.iter().map(MessageResponse::from).collect(),
            next_cursor: page.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{MessageText, NewMessage};
    use crate::domain::foundation::Timestamp;

    fn message() -> Message {
        Message::from_new(
            MessageId::from_raw(4),
            NewMessage {
                conversation_id: ConversationId::from_raw(2),
                sender_id: UserId::from_raw(1),
                content: MessageText::parse("Hello", 100).unwrap(),
            },
            Timestamp::now(),
        )
    }

    #[test]
    fn success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success("ok", 5)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "ok", "data": 5}));
    }

    #[test]
    fn deleted_message_hides_content() {
        let mut message = message();
        message.delete();

        let json = serde_json::to_value(MessageResponse::from(&message)).unwrap();

        assert!(json["content"].is_null());
        assert_eq!(json["is_deleted"], true);
    }

    #[test]
    fn page_params_clamp_limit() {
        let page = PageParams {
            after: Some(7),
            limit: Some(100_000),
        }
        .into_page();

        assert_eq!(page.after, Some(MessageId::from_raw(7)));
        assert_eq!(page.limit, crate::ports::MAX_PAGE_SIZE);
    }
}
