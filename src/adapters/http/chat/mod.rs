//! Chat HTTP adapter - REST endpoints over conversations and messages.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ApiResponse, ConversationResponse, ConversationSummaryResponse, EditMessageRequest,
    ErrorResponse, MessagePageResponse, MessageResponse, PageParams, UserSummaryResponse,
};
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, chat_routes};
