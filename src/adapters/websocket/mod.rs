//! WebSocket adapters for realtime chat.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   GET /ws/chat/?token=...   (chat_ws_handler)                        │
//! │   - resolves the principal, 401 before upgrade on failure            │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ one per connection
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ChatSession                                     │
//! │   - parses inbound frames, runs SendChatMessageHandler              │
//! │   - enrolls participants into the conversation group                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ broadcasts
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      GroupRegistry                                   │
//! │   user_1        admin_support        conversation_7                 │
//! │   ├── conn-a    ├── conn-d           ├── conn-a                     │
//! │   └── conn-b    └── conn-e           └── conn-c                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`groups`] - Broadcast group membership
//! - [`session`] - Per-connection state machine
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod groups;
pub mod handler;
pub mod messages;
pub mod session;

pub use groups::{ConnectionId, Group, GroupRegistry};
pub use handler::{chat_socket_router, chat_ws_handler, ChatSocketState, ConnectParams};
pub use messages::{
    ChatMessageFrame, ClientCommand, ErrorFrame, IdRef, InboundPayload, ServerEvent,
};
pub use session::{ChatContext, ChatSession};
