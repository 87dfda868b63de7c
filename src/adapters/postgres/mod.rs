//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresUserDirectory` - Read-only view of the account service's users
//! - `PostgresConversationRepository` - Conversations with pair uniqueness
//! - `PostgresMessageRepository` - Per-conversation message log

mod conversation_repository;
mod message_repository;
mod user_directory;

pub use conversation_repository::PostgresConversationRepository;
pub use message_repository::PostgresMessageRepository;
pub use user_directory::PostgresUserDirectory;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Opens the connection pool described by the database configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
