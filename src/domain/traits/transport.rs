use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{Address, InboundMessage};

/// Transport trait - abstraction for the groupchat connection
///
/// Connection setup, presence and stanza encoding live behind this trait.
/// `send_message` may be called concurrently with `recv`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the session
    async fn connect(&self) -> Result<(), BotError>;

    /// Send a message body to a room or a user
    async fn send_message(&self, destination: &Address, body: &str) -> Result<(), BotError>;

    /// Join a room under the given nickname
    async fn join_room(&self, room: &Address, nickname: &str) -> Result<(), BotError>;

    /// Wait for the next inbound message; `None` once the stream has ended
    async fn recv(&self) -> Result<Option<InboundMessage>, BotError>;
}
