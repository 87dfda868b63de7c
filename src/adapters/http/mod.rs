//! HTTP adapters - REST API and application router.
//!
//! `build_app` merges the chat REST routes and the chat WebSocket endpoint
//! into one router with tracing and CORS applied.

pub mod chat;
pub mod middleware;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{chat_socket_router, ChatSocketState};

pub use chat::{chat_router, ChatApiError, ChatAppState};
pub use middleware::{auth_middleware, AuthRejection, AuthState, RequireAuth};

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Build the complete application router.
pub fn build_app(
    chat_state: ChatAppState,
    socket_state: ChatSocketState,
    identity: AuthState,
    cors_origins: &[String],
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(chat_router(identity).with_state(chat_state))
        .merge(chat_socket_router().with_state(socket_state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins. `*` allows any origin; an empty list
/// adds no allowed origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
