//! Per-connection realtime chat session.
//!
//! Lifecycle:
//!
//! ```text
//! Connecting ──authenticate──► Open ──close──► Closed
//!      │                        │ ▲
//!      └─ rejected (401)        └─┘ one inbound event at a time
//! ```
//!
//! A session processes its inbound events sequentially, so two messages sent
//! on one connection are persisted and fanned out in the order received.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::{
    IdentityResolver, SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
use crate::domain::chat::{ChatError, ConversationKind};
use crate::domain::foundation::{MessageId, Principal, ValidationError};

use super::groups::{ConnectionId, Group, GroupRegistry};
use super::messages::{ClientCommand, InboundPayload, ServerEvent};

/// Shared dependencies of every chat connection.
#[derive(Clone)]
pub struct ChatContext {
    pub identity: IdentityResolver,
    pub send: Arc<SendChatMessageHandler>,
    pub groups: Arc<GroupRegistry>,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
}

impl ChatContext {
    pub fn new(
        identity: IdentityResolver,
        send: Arc<SendChatMessageHandler>,
        groups: Arc<GroupRegistry>,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            identity,
            send,
            groups,
            outbound_buffer,
        }
    }

    /// Resolves the connection credential. Runs before any group is joined.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, ChatError> {
        Ok(self.identity.resolve(token).await?)
    }
}

/// An open chat connection.
pub struct ChatSession {
    connection: ConnectionId,
    principal: Principal,
    outbound: mpsc::Sender<ServerEvent>,
    ctx: ChatContext,
}

impl ChatSession {
    /// Opens a session for an authenticated principal.
    ///
    /// Joins the personal inbox group, and the admin-support group for
    /// admins. The returned receiver yields everything addressed to this
    /// connection.
    pub async fn open(ctx: ChatContext, principal: Principal) -> (Self, mpsc::Receiver<ServerEvent>) {
        let connection = ConnectionId::new();
        let (outbound, rx) = mpsc::channel(ctx.outbound_buffer.max(1));

        ctx.groups.register(connection, outbound.clone()).await;
        ctx.groups.join(Group::Inbox(principal.user_id), connection).await;
        if principal.is_admin {
            ctx.groups.join(Group::AdminSupport, connection).await;
        }

        tracing::info!(
            connection_id = %connection,
            user_id = %principal.user_id,
            is_admin = principal.is_admin,
            "Chat connection opened"
        );

        let session = Self {
            connection,
            principal,
            outbound,
            ctx,
        };
        (session, rx)
    }

    /// Authenticates and opens in one step.
    pub async fn connect(
        ctx: ChatContext,
        token: Option<&str>,
    ) -> Result<(Self, mpsc::Receiver<ServerEvent>), ChatError> {
        let principal = ctx.authenticate(token).await?;
        Ok(Self::open(ctx, principal).await)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Processes one inbound text frame.
    ///
    /// On failure the error frame goes to this connection only and the
    /// session stays open.
    pub async fn handle_text(&self, frame: &str) -> Result<MessageId, ChatError> {
        match self.process(frame).await {
            Ok(id) => Ok(id),
            Err(error) => {
                self.reject(&error);
                Err(error)
            }
        }
    }

    /// Binary frames are not part of the protocol.
    pub fn handle_binary(&self) -> ChatError {
        let error = ChatError::Validation(ValidationError::invalid_format(
            "payload",
            "binary frames are not supported",
        ));
        self.reject(&error);
        error
    }

    /// Releases every group membership of this connection.
    pub async fn close(self) {
        let released = self.ctx.groups.unregister(self.connection).await;
        tracing::info!(
            connection_id = %self.connection,
            user_id = %self.principal.user_id,
            groups = released,
            "Chat connection closed"
        );
    }

    async fn process(&self, frame: &str) -> Result<MessageId, ChatError> {
        let ClientCommand::SendMessage { target, text } = InboundPayload::parse(frame)?.into_command()?;

        let SendChatMessageResult {
            conversation,
            message,
        } = self
            .ctx
            .send
            .handle(SendChatMessageCommand {
                sender: self.principal.clone(),
                target,
                text,
            })
            .await?;

        // Lazy join: live connections of every party enter the group before
        // the first broadcast, so the recipient of a brand-new conversation
        // receives it too.
        let mut sources: Vec<Group> = conversation
            .participants()
            .into_iter()
            .map(Group::Inbox)
            .collect();
        if conversation.kind() == ConversationKind::UserToAdmin {
            sources.push(Group::AdminSupport);
        }
        let group = Group::Conversation(conversation.id());
        self.ctx.groups.enroll(group, self.connection, &sources).await;

        let delivered = self
            .ctx
            .groups
            .broadcast(group, ServerEvent::message(&self.principal, &message))
            .await;

        tracing::debug!(
            connection_id = %self.connection,
            conversation_id = %conversation.id(),
            message_id = %message.id(),
            delivered,
            "Message fanned out"
        );

        Ok(message.id())
    }

    fn reject(&self, error: &ChatError) {
        match error {
            ChatError::Persistence(detail) => tracing::error!(
                connection_id = %self.connection,
                user_id = %self.principal.user_id,
                error = %detail,
                "Chat event failed"
            ),
            _ => tracing::debug!(
                connection_id = %self.connection,
                user_id = %self.principal.user_id,
                error = %error,
                "Chat event rejected"
            ),
        }

        if self
            .outbound
            .try_send(ServerEvent::error(error.client_message()))
            .is_err()
        {
            tracing::warn!(connection_id = %self.connection, "Could not queue error reply");
        }
    }
}
