//! Ghorkhoje Chat server
//!
//! Serves the chat WebSocket endpoint and REST surface until Ctrl+C.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ghorkhoje_chat::adapters::auth::{JwtConfig, JwtSessionValidator};
use ghorkhoje_chat::adapters::http::{build_app, ChatAppState};
use ghorkhoje_chat::adapters::postgres::{
    self, PostgresConversationRepository, PostgresMessageRepository, PostgresUserDirectory,
};
use ghorkhoje_chat::adapters::websocket::{ChatContext, ChatSocketState, GroupRegistry};
use ghorkhoje_chat::application::{
    ConversationDirectory, IdentityResolver, MessageStore, SendChatMessageHandler,
};
use ghorkhoje_chat::config::AppConfig;
use ghorkhoje_chat::ports::{ConversationRepository, MessageRepository, UserDirectory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    setup_logging(&config);

    let addr = config.server.socket_addr()?;
    tracing::info!(
        environment = ?config.server.environment,
        %addr,
        "Starting ghorkhoje-chat"
    );

    // Database
    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::migrate(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Ports
    let users: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let conversations: Arc<dyn ConversationRepository> =
        Arc::new(PostgresConversationRepository::new(pool.clone()));
    let messages: Arc<dyn MessageRepository> =
        Arc::new(PostgresMessageRepository::new(pool.clone()));

    let jwt = JwtConfig::new(config.auth.jwt_secret.clone()).with_leeway(config.auth.leeway_secs);
    let identity = IdentityResolver::new(Arc::new(JwtSessionValidator::new(jwt, users.clone())));

    // Services
    let directory = Arc::new(ConversationDirectory::new(conversations.clone(), users.clone()));
    let store = Arc::new(MessageStore::new(directory.clone(), conversations, messages));
    let max_len = config.realtime.max_message_len;

    let chat_state = ChatAppState {
        directory: directory.clone(),
        store: store.clone(),
        users,
        max_message_len: max_len,
    };
    let socket_state = ChatSocketState::new(
        ChatContext::new(
            identity.clone(),
            Arc::new(SendChatMessageHandler::new(directory, store, max_len)),
            Arc::new(GroupRegistry::new()),
            config.realtime.outbound_buffer,
        ),
        config.realtime.idle_timeout(),
    );

    let app = build_app(
        chat_state,
        socket_state,
        identity,
        &config.server.cors_origins_list(),
    );

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level`; production logs are JSON.
fn setup_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down gracefully...");
}
