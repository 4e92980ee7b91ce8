use super::Address;
use chrono::{DateTime, Utc};

/// How a message reached the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Posted to a shared room, visible to every participant
    RoomBroadcast,
    /// Sent 1:1 to the bot
    Direct,
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::RoomBroadcast => "groupchat",
            MessageKind::Direct => "chat",
        }
    }
}

/// An incoming message as handed over by the transport
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub origin: Address,
    pub body: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    directed: Option<bool>,
}

impl InboundMessage {
    pub fn new(origin: Address, body: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            origin,
            body: body.into(),
            kind,
            timestamp: Utc::now(),
            directed: None,
        }
    }

    pub fn room(origin: Address, body: impl Into<String>) -> Self {
        Self::new(origin, body, MessageKind::RoomBroadcast)
    }

    pub fn direct(origin: Address, body: impl Into<String>) -> Self {
        Self::new(origin, body, MessageKind::Direct)
    }

    pub fn is_room_broadcast(&self) -> bool {
        self.kind == MessageKind::RoomBroadcast
    }

    /// Whether the message was resolved as addressed to the bot.
    /// `None` until the dispatcher has run the addressing policy.
    pub fn directed(&self) -> Option<bool> {
        self.directed
    }

    /// Records the addressing decision. Only the first call has an effect.
    pub fn mark_directed(&mut self, directed: bool) {
        if self.directed.is_none() {
            self.directed = Some(directed);
        }
    }

    /// Where a reply to this message should go: the room itself for room
    /// traffic, the sender for direct messages.
    pub fn reply_to(&self) -> Address {
        match self.kind {
            MessageKind::RoomBroadcast => self.origin.bare(),
            MessageKind::Direct => self.origin.clone(),
        }
    }
}
