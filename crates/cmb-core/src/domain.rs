/// Sender (author) identity. Opaque JID-style string assigned by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SenderId(pub String);

/// Origin identity: the chat/group/channel a message was sent to, as opposed
/// to its author. In direct chats the two coincide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OriginId(pub String);

/// Transport-assigned message id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl SenderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl OriginId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An inbound chat message, owned by the transport and read-only to the core.
///
/// `sender` is the author identity when the transport exposes one, otherwise
/// the origin identity; the adapter resolves that before handing the message
/// to the pipeline.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub id: MessageId,
    pub sender: SenderId,
    pub origin: OriginId,
    pub body: String,
    pub mentions: Vec<SenderId>,
    pub is_group: bool,
}

/// Chat metadata returned by the transport's `get_chat`.
#[derive(Clone, Debug)]
pub struct ChatInfo {
    pub name: String,
    pub participants: Vec<SenderId>,
    pub description: Option<String>,
}

/// A group membership lifecycle notification (join or leave).
#[derive(Clone, Debug)]
pub struct GroupEvent {
    pub origin: OriginId,
    pub participant: SenderId,
}

/// Outbound side effect produced by the pipeline, consumed by the action
/// executor driving the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundAction {
    /// Reply in the chat the message came from.
    Reply(String),
    /// Send to the originating chat with explicit mentions.
    SendToOrigin {
        text: String,
        mentions: Vec<SenderId>,
    },
    /// Delete the triggering message (for everyone, where supported).
    DeleteMessage,
    /// Request removal of a participant from the originating group.
    RemoveParticipant(SenderId),
}

/// Everything the transport can hand to the bot.
///
/// Lifecycle events (`Ready`, `Authenticated`, ...) are logged; pairing-code
/// rendering is the adapter's concern.
#[derive(Clone, Debug)]
pub enum TransportEvent {
    Message(InboundMessage),
    GroupJoin(GroupEvent),
    GroupLeave(GroupEvent),
    Ready,
    Authenticated,
    AuthFailure(String),
    PairingCode(String),
}
