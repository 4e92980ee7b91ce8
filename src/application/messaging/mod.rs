//! Message handling - Addressing, parsing, dispatching and the outbound path

pub mod addressing;
pub mod dispatcher;
pub mod keepalive;
pub mod outbound;
pub mod parser;

pub use addressing::AddressingPolicy;
pub use dispatcher::{DispatchOutcome, Dispatcher, DEFAULT_FAILURE_REPLY};
pub use keepalive::{KeepaliveMonitor, KEEPALIVE_BODY};
pub use outbound::{Outbound, SendClock};
pub use parser::{split_command_word, MessageParser, ParseError};
