//! Domain layer - Core business logic
//!
//! This layer contains:
//! - Entities: Core business objects (Address, InboundMessage, Room, User, CommandDescriptor)
//! - Traits: Abstractions for infrastructure (Transport, AdminApi)

pub mod entities;
pub mod traits;
