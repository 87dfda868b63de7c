//! Axum router configuration for chat endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    archive_conversation, delete_message, edit_message, list_conversations, list_messages,
    list_messages_with_user, mark_message_read, ChatAppState,
};

/// Create the chat API routes.
///
/// # Routes (all require authentication)
/// - `GET /conversations/` - Conversations visible to the caller
/// - `POST /conversations/:id/archive/` - Archive a conversation
/// - `GET /messages/:id/` - Page of a conversation's messages
/// - `PATCH /messages/:id/` - Edit a message
/// - `DELETE /messages/:id/` - Soft-delete a message
/// - `POST /messages/:id/read/` - Mark a message read
/// - `GET /messages-by-user-id/:id/` - Messages exchanged with a user
///
/// `GET /messages/:id/` takes a conversation id; `PATCH`/`DELETE` on the
/// same path take a message id.
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/conversations/", get(list_conversations))
        .route("/conversations/:id/archive/", post(archive_conversation))
        .route(
            "/messages/:id/",
            get(list_messages).patch(edit_message).delete(delete_message),
        )
        .route("/messages/:id/read/", post(mark_message_read))
        .route("/messages-by-user-id/:id/", get(list_messages_with_user))
}

/// Create the complete chat module router, mounted at `/api/chat`.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(chat_router(identity))
///     .with_state(chat_state);
/// ```
pub fn chat_router(identity: AuthState) -> Router<ChatAppState> {
    Router::new()
        .nest("/api/chat", chat_routes())
        .route_layer(middleware::from_fn_with_state(identity, auth_middleware))
}
