//! Ghorkhoje Chat - Realtime messaging for the Ghorkhoje rental marketplace
//!
//! Tenants, owners and support staff exchange messages over a WebSocket
//! endpoint; conversation history is also served over REST.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
