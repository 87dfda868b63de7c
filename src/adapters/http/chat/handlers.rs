//! HTTP handlers for chat endpoints.
//!
//! These handlers connect Axum routes to the chat command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    ArchiveConversationCommand, ArchiveConversationHandler, ConversationDirectory,
    DeleteMessageCommand, DeleteMessageHandler, EditMessageCommand, EditMessageHandler,
    ListConversationsHandler, ListConversationsQuery, ListMessagesHandler, ListMessagesQuery,
    MarkReadCommand, MarkReadHandler, MessageSource, MessageStore,
};
use crate::domain::chat::{ChatError, MissingEntity};
use crate::domain::foundation::{ConversationId, MessageId, UserId};
use crate::ports::UserDirectory;

use super::dto::{
    ApiResponse, ConversationResponse, ConversationSummaryResponse, EditMessageRequest,
    ErrorResponse, MessagePageResponse, MessageResponse, PageParams,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the chat REST surface.
#[derive(Clone)]
pub struct ChatAppState {
    pub directory: Arc<ConversationDirectory>,
    pub store: Arc<MessageStore>,
    pub users: Arc<dyn UserDirectory>,
    pub max_message_len: usize,
}

impl ChatAppState {
    pub fn list_conversations_handler(&self) -> ListConversationsHandler {
        ListConversationsHandler::new(
            self.directory.clone(),
            self.store.clone(),
            self.users.clone(),
        )
    }

    pub fn list_messages_handler(&self) -> ListMessagesHandler {
        ListMessagesHandler::new(self.store.clone())
    }

    pub fn mark_read_handler(&self) -> MarkReadHandler {
        MarkReadHandler::new(self.store.clone())
    }

    pub fn edit_message_handler(&self) -> EditMessageHandler {
        EditMessageHandler::new(self.store.clone(), self.max_message_len)
    }

    pub fn delete_message_handler(&self) -> DeleteMessageHandler {
        DeleteMessageHandler::new(self.store.clone())
    }

    pub fn archive_conversation_handler(&self) -> ArchiveConversationHandler {
        ArchiveConversationHandler::new(self.directory.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/chat/conversations/ - Conversations visible to the caller
pub async fn list_conversations(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let summaries = state
        .list_conversations_handler()
        .handle(ListConversationsQuery { principal })
        .await?;

    let data: Vec<_> = summaries
        .iter()
        .map(ConversationSummaryResponse::from)
        .collect();

    Ok(Json(ApiResponse::success("Conversations retrieved successfully", data)))
}

/// GET /api/chat/messages/:conversation_id/ - One page of a conversation
pub async fn list_messages(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(conversation_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let page = state
        .list_messages_handler()
        .handle(ListMessagesQuery {
            principal,
            source: MessageSource::Conversation(ConversationId::from_raw(conversation_id)),
            page: params.into_page(),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Messages retrieved successfully",
        MessagePageResponse::from(&page),
    )))
}

/// GET /api/chat/messages-by-user-id/:user_id/ - History with a counterpart
pub async fn list_messages_with_user(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let page = state
        .list_messages_handler()
        .handle(ListMessagesQuery {
            principal,
            source: MessageSource::Counterpart(UserId::from_raw(user_id)),
            page: params.into_page(),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Messages retrieved successfully",
        MessagePageResponse::from(&page),
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST/PATCH/DELETE endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/chat/messages/:message_id/read/ - Mark a message read
pub async fn mark_message_read(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ChatApiError> {
    let message = state
        .mark_read_handler()
        .handle(MarkReadCommand {
            reader: principal,
            message_id: MessageId::from_raw(message_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Message marked as read",
        MessageResponse::from(&message),
    )))
}

/// PATCH /api/chat/messages/:message_id/ - Edit a message's text
pub async fn edit_message(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(message_id): Path<i64>,
    Json(request): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let message = state
        .edit_message_handler()
        .handle(EditMessageCommand {
            editor: principal,
            message_id: MessageId::from_raw(message_id),
            text: request.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Message updated successfully",
        MessageResponse::from(&message),
    )))
}

/// DELETE /api/chat/messages/:message_id/ - Soft-delete a message
pub async fn delete_message(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ChatApiError> {
    let message = state
        .delete_message_handler()
        .handle(DeleteMessageCommand {
            actor: principal,
            message_id: MessageId::from_raw(message_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Message deleted successfully",
        MessageResponse::from(&message),
    )))
}

/// POST /api/chat/conversations/:conversation_id/archive/ - Archive a conversation
pub async fn archive_conversation(
    State(state): State<ChatAppState>,
    RequireAuth(principal): RequireAuth,
    Path(conversation_id): Path<i64>,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversation = state
        .archive_conversation_handler()
        .handle(ArchiveConversationCommand {
            principal,
            conversation_id: ConversationId::from_raw(conversation_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        "Conversation archived successfully",
        ConversationResponse::from(&conversation),
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts chat errors to HTTP responses.
#[derive(Debug)]
pub struct ChatApiError(ChatError);

impl From<ChatError> for ChatApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl ChatApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ChatError::AuthenticationRejected(auth) if auth.is_transient() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ChatError::AuthenticationRejected(_) => StatusCode::UNAUTHORIZED,
            ChatError::AccessDenied | ChatError::NotFound(MissingEntity::Conversation) => {
                StatusCode::FORBIDDEN
            }
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::Inactive => StatusCode::CONFLICT,
            ChatError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if let ChatError::Persistence(detail) = &self.0 {
            tracing::error!(error = %detail, "Chat request failed");
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.client_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AuthError, ValidationError};

    fn status_of(err: ChatError) -> StatusCode {
        ChatApiError::from(err).into_response().status()
    }

    #[test]
    fn api_error_maps_access_and_unknown_conversation_to_403() {
        assert_eq!(status_of(ChatError::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ChatError::NotFound(MissingEntity::Conversation)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn api_error_maps_missing_message_to_404() {
        assert_eq!(
            status_of(ChatError::NotFound(MissingEntity::Message)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = ChatError::Validation(ValidationError::empty_field("message"));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_inactive_to_409() {
        assert_eq!(status_of(ChatError::Inactive), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_auth_and_persistence() {
        assert_eq!(
            status_of(ChatError::AuthenticationRejected(AuthError::TokenExpired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ChatError::AuthenticationRejected(AuthError::service_unavailable("db"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ChatError::Persistence("pool timed out".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
