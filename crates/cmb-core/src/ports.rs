use async_trait::async_trait;

use crate::{
    domain::{ChatInfo, InboundMessage, OriginId, SenderId},
    Result,
};

/// Hexagonal port for the chat transport.
///
/// The real transport (session handshake, pairing, wire codec) lives in an
/// adapter crate; this is the surface the core needs from it. Failures map to
/// [`crate::Error::Transport`] and are caught at the call site by the
/// pipeline's action executor.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Reply in the chat `msg` came from.
    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<()>;

    /// Send to a chat by origin id, with explicit mentions.
    async fn send_to_origin(&self, origin: &OriginId, text: &str, mentions: &[SenderId])
        -> Result<()>;

    /// Delete a message; `everyone` requests deletion for all participants.
    async fn delete_message(&self, msg: &InboundMessage, everyone: bool) -> Result<()>;

    /// Fetch chat metadata (name, participants, optional description).
    async fn get_chat(&self, origin: &OriginId) -> Result<ChatInfo>;

    /// Request removal of a participant from a group.
    async fn remove_participant(&self, origin: &OriginId, id: &SenderId) -> Result<()>;

    /// Push new bio/status text upstream.
    async fn set_bio(&self, text: &str) -> Result<()>;
}

/// Optional fire-and-forget sink for command usage records. Failures are
/// logged by the caller, never raised.
#[async_trait]
pub trait CommandUsageSink: Send + Sync {
    async fn record(&self, command: &str, sender: &SenderId, timestamp: &str) -> Result<()>;
}
