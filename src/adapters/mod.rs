//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the chat core to external systems:
//! - `auth` - Session validators (JWT, mock)
//! - `memory` - In-memory repositories for tests and local development
//! - `postgres` - PostgreSQL repositories and migrations
//! - `websocket` - Realtime chat endpoint and broadcast groups
//! - `http` - REST endpoints and the application router

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
