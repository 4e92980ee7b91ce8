//! Application layer errors

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by command handlers and observers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Plugin loading and registration errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Failed to load plugin: {0}")]
    Load(String),

    #[error("Plugin registration failed: {0}")]
    Register(String),

    #[error("Reserved command name: {0}")]
    ReservedName(String),
}

/// Administration API and directory errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Administration API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Runs plugin-supplied code, turning a panic into its message.
pub(crate) fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
