//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Directory cache, identity resolution, command registry, run loop
//! - Errors: Domain-specific errors
//! - Messaging: Addressing, parsing, dispatching, keepalive

pub mod errors;
pub mod messaging;
pub mod services;
