//! WebSocket upgrade handler for realtime chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Resolve the `token` query parameter (401 before upgrading on failure)
//! 2. Upgrade to WebSocket and open a [`ChatSession`]
//! 3. Drain the session's outbound queue into the socket on a writer task
//! 4. Feed inbound frames to the session until close, error or idle timeout
//! 5. Release group memberships

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::domain::chat::ChatError;
use crate::domain::foundation::Principal;

use super::session::{ChatContext, ChatSession};

/// How long the writer may keep flushing after the reader has stopped.
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct ChatSocketState {
    pub ctx: ChatContext,
    /// Close connections that send nothing for this long. `None` disables.
    pub idle_timeout: Option<Duration>,
}

impl ChatSocketState {
    pub fn new(ctx: ChatContext, idle_timeout: Option<Duration>) -> Self {
        Self { ctx, idle_timeout }
    }
}

/// Query string of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests for chat.
///
/// Route: `GET /ws/chat/?token=<jwt>`
pub async fn chat_ws_handler(
    State(state): State<ChatSocketState>,
    Query(params): Query<ConnectParams>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let principal = match state.ctx.authenticate(params.token.as_deref()).await {
        Ok(principal) => principal,
        Err(error) => {
            let status = match &error {
                ChatError::AuthenticationRejected(auth) if auth.is_transient() => {
                    tracing::error!(error = %auth, "Auth service unavailable during connect");
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::UNAUTHORIZED,
            };
            return (
                status,
                Json(serde_json::json!({ "error": error.client_message() })),
            )
                .into_response();
        }
    };

    // Credentials are checked first so a bad token always reads as 401.
    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(serde_json::json!({ "error": "WebSocket upgrade required." })),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, principal))
}

/// Runs an established connection until it ends.
async fn handle_socket(socket: WebSocket, state: ChatSocketState, principal: Principal) {
    let (session, mut events) = ChatSession::open(state.ctx.clone(), principal).await;
    let connection = session.connection_id();
    let (mut sender, mut receiver) = socket.split();

    // Single writer per socket; everything addressed to this connection
    // arrives through the session's queue in FIFO order.
    let mut writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(connection_id = %connection, "Failed to encode event: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json)).await {
                tracing::debug!(connection_id = %connection, "Send error, closing connection: {}", e);
                break;
            }
        }
        let _ = sender.close().await;
    });

    loop {
        let next = match state.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(connection_id = %connection, "Closing idle connection");
                    break;
                }
            },
            None => receiver.next().await,
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                // Errors were already reported to the client.
                let _ = session.handle_text(&text).await;
            }
            Some(Ok(Message::Binary(_))) => {
                session.handle_binary();
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                // Protocol keepalive, answered by axum
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!(connection_id = %connection, "Client closed connection");
                break;
            }
            Some(Err(e)) => {
                tracing::debug!(connection_id = %connection, "Receive error: {}", e);
                break;
            }
        }

        if writer.is_finished() {
            break;
        }
    }

    // Dropping the session drops the last queue handle, which ends the writer.
    session.close().await;
    if tokio::time::timeout(WRITER_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }
}

/// Create axum router for the chat WebSocket endpoint.
pub fn chat_socket_router() -> axum::Router<ChatSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws/chat/", get(chat_ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::memory::{
        InMemoryConversationRepository, InMemoryMessageRepository, InMemoryUserDirectory,
    };
    use crate::adapters::websocket::GroupRegistry;
    use crate::domain::foundation::AuthError;
    use crate::application::{
        ConversationDirectory, IdentityResolver, MessageStore, SendChatMessageHandler,
    };

    fn state() -> ChatSocketState {
        let users = Arc::new(InMemoryUserDirectory::new().with_test_user(1, false));
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let directory = Arc::new(ConversationDirectory::new(conversations.clone(), users));
        let store = Arc::new(MessageStore::new(
            directory.clone(),
            conversations,
            Arc::new(InMemoryMessageRepository::new()),
        ));
        let validator = MockSessionValidator::new()
            .with_test_user("t1", 1, false)
            .with_failure("expired", AuthError::TokenExpired)
            .with_failure("down", AuthError::service_unavailable("directory offline"));
        let ctx = ChatContext::new(
            IdentityResolver::new(Arc::new(validator)),
            Arc::new(SendChatMessageHandler::new(directory, store, 100)),
            Arc::new(GroupRegistry::new()),
            8,
        );
        ChatSocketState::new(ctx, Some(Duration::from_secs(300)))
    }

    fn upgrade_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_rejected_before_upgrade() {
        let app = chat_socket_router().with_state(state());

        let response = app.oneshot(upgrade_request("/ws/chat/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Authentication failed.");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_upgrade() {
        let state = state();
        let groups = state.ctx.groups.clone();
        let app = chat_socket_router().with_state(state);

        let response = app
            .oneshot(upgrade_request("/ws/chat/?token=nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(groups.connection_count().await, 0);
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let app = chat_socket_router().with_state(state());

        let response = app
            .oneshot(upgrade_request("/ws/chat/?token=expired"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unavailable_user_directory_is_503_not_401() {
        let state = state();
        let groups = state.ctx.groups.clone();
        let app = chat_socket_router().with_state(state);

        let response = app
            .oneshot(upgrade_request("/ws/chat/?token=down"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Authentication service unavailable.");
        assert_eq!(groups.connection_count().await, 0);
    }

    #[tokio::test]
    async fn plain_request_with_valid_token_needs_upgrade() {
        let app = chat_socket_router().with_state(state());
        let request = Request::builder()
            .uri("/ws/chat/?token=t1")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }
}
