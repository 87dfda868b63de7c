//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `GHORKHOJE_CHAT` prefix and nested
//! values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use ghorkhoje_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod realtime;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_LEN};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root configuration of the chat service.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `GHORKHOJE_CHAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GHORKHOJE_CHAT__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    ///
    /// A `.env` file is read first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GHORKHOJE_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(self.server.environment)?;
        self.realtime.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GHORKHOJE_CHAT__DATABASE__URL",
        "GHORKHOJE_CHAT__AUTH__JWT_SECRET",
        "GHORKHOJE_CHAT__SERVER__PORT",
        "GHORKHOJE_CHAT__SERVER__ENVIRONMENT",
        "GHORKHOJE_CHAT__REALTIME__IDLE_TIMEOUT_SECS",
    ];

    fn set_minimal_env() {
        env::set_var("GHORKHOJE_CHAT__DATABASE__URL", "postgresql://chat@localhost/chat");
        env::set_var(
            "GHORKHOJE_CHAT__AUTH__JWT_SECRET",
            "a-signing-secret-that-is-long-enough-for-prod",
        );
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://chat@localhost/chat");
        assert!(config.auth.jwt_secret.expose_secret().starts_with("a-signing"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.realtime.idle_timeout_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_overrides_are_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GHORKHOJE_CHAT__SERVER__PORT", "9001");
        env::set_var("GHORKHOJE_CHAT__SERVER__ENVIRONMENT", "production");
        env::set_var("GHORKHOJE_CHAT__REALTIME__IDLE_TIMEOUT_SECS", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 9001);
        assert!(config.is_production());
        assert_eq!(config.realtime.idle_timeout(), None);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GHORKHOJE_CHAT__DATABASE__URL", "postgresql://chat@localhost/chat");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
