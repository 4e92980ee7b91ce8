//! Application services - Directory, identity, command registry and the run loop

pub mod bot_service;
pub mod command_registry;
pub mod directory;
pub mod identity;

pub use bot_service::{BotService, KeepaliveSettings};
pub use command_registry::{CommandRegistry, InstallReport, RESERVED_COMMANDS};
pub use directory::{DirectoryCache, RoomMap, UserAddressing, UserMap, UserNameMap};
pub use identity::IdentityResolver;
