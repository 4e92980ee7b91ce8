//! Message parser - Builds inbound messages from raw transport input

use thiserror::Error;

use crate::domain::entities::{Address, AddressError, InboundMessage, MessageKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected '<address>: <message>'")]
    MissingSeparator,

    #[error("invalid sender address: {0}")]
    Address(#[from] AddressError),
}

/// Parses incoming text into structured messages
#[derive(Debug, Clone)]
pub struct MessageParser {
    room_domain: String,
}

impl MessageParser {
    pub fn new(room_domain: impl Into<String>) -> Self {
        Self {
            room_domain: room_domain.into(),
        }
    }

    /// Build a message, classifying it by the origin's domain
    pub fn parse(&self, origin: Address, body: impl Into<String>) -> InboundMessage {
        let kind = if origin.domain() == self.room_domain {
            MessageKind::RoomBroadcast
        } else {
            MessageKind::Direct
        };
        InboundMessage::new(origin, body, kind)
    }

    /// Parse a `<address>: <message>` line
    pub fn parse_line(&self, line: &str) -> Result<InboundMessage, ParseError> {
        let (from, body) = line.split_once(": ").ok_or(ParseError::MissingSeparator)?;
        let origin: Address = from.parse()?;
        Ok(self.parse(origin, body))
    }
}

/// Split a body into its first whitespace-delimited word and the rest
/// (the rest keeps its leading separator).
pub fn split_command_word(body: &str) -> (&str, &str) {
    match body.find(char::is_whitespace) {
        Some(index) => body.split_at(index),
        None => (body, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_room_lines() {
        let parser = MessageParser::new("conf.example.com");
        let msg = parser.parse_line("lobby@conf.example.com/Alice Smith: hi: there").unwrap();
        assert_eq!(msg.kind, MessageKind::RoomBroadcast);
        assert_eq!(msg.origin.resource(), Some("Alice Smith"));
        assert_eq!(msg.body, "hi: there");
    }

    #[test]
    fn classifies_direct_lines() {
        let parser = MessageParser::new("conf.example.com");
        let msg = parser.parse_line("1_2@chat.example.com: ping").unwrap();
        assert_eq!(msg.kind, MessageKind::Direct);
    }

    #[test]
    fn rejects_malformed_lines() {
        let parser = MessageParser::new("conf.example.com");
        assert_eq!(parser.parse_line("no separator").unwrap_err(), ParseError::MissingSeparator);
        assert!(matches!(parser.parse_line("nodomain: hi"), Err(ParseError::Address(_))));
    }

    #[test]
    fn splits_first_word() {
        assert_eq!(split_command_word("status now please"), ("status", " now please"));
        assert_eq!(split_command_word("status"), ("status", ""));
        assert_eq!(split_command_word("a\tb"), ("a", "\tb"));
    }
}
