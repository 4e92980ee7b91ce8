//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Admin: Administration API client
//! - Adapters: Transport implementations
//! - Plugins: Shared-library plugin loading

pub mod adapters;
pub mod admin;
pub mod config;
pub mod plugins;
