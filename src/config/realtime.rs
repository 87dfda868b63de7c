//! Realtime (WebSocket) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::chat::DEFAULT_MAX_MESSAGE_LEN;

/// Per-connection limits for the chat socket.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Seconds without an inbound frame before the socket is closed; 0 disables
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Frames queued per connection before fan-out starts dropping
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Longest accepted message text, in characters
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl RealtimeConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_buffer == 0 {
            return Err(ValidationError::InvalidOutboundBuffer);
        }
        if self.max_message_len == 0 {
            return Err(ValidationError::InvalidMaxMessageLength);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            outbound_buffer: default_outbound_buffer(),
            max_message_len: default_max_message_len(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_max_message_len() -> usize {
    DEFAULT_MAX_MESSAGE_LEN
}
