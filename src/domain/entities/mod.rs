//! Domain entities - Core business objects

pub mod address;
pub mod command;
pub mod message;
pub mod room;
pub mod user;

pub use address::{Address, AddressError};
pub use command::{
    CommandDescriptor, CommandHandler, CommandKind, ContentAction, ContentFilter, HandlerContext,
    HandlerResult, ObserverFn,
};
pub use message::{InboundMessage, MessageKind};
pub use room::Room;
pub use user::User;
