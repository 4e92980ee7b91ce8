//! Domain traits - Abstractions for infrastructure implementations

pub mod admin;
pub mod transport;

pub use admin::{AdminApi, StatusMessage, UnavailableAdminApi};
pub use transport::Transport;
