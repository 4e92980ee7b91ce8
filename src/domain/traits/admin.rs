use serde::Serialize;
use serde_json::Value;

use crate::application::errors::DirectoryError;

/// Administration API - blocking RPC access to the directory
pub trait AdminApi: Send + Sync {
    /// Raw room records
    fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError>;

    /// Raw user records
    fn list_users(&self) -> Result<Vec<Value>, DirectoryError>;

    /// Post a colored notice to a room
    fn post_message(&self, message: &StatusMessage) -> Result<(), DirectoryError>;
}

/// A colored room notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub room_id: String,
    pub from: String,
    pub color: String,
    pub message_format: String,
    pub message: String,
}

impl StatusMessage {
    pub fn html(room_id: impl Into<String>, from: impl Into<String>, color: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            from: from.into(),
            color: color.into(),
            message_format: "html".to_string(),
            message: html.into(),
        }
    }
}

/// Stand-in used when no API token or endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAdminApi;

impl AdminApi for UnavailableAdminApi {
    fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError> {
        Err(DirectoryError::Unavailable)
    }

    fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
        Err(DirectoryError::Unavailable)
    }

    fn post_message(&self, _message: &StatusMessage) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable)
    }
}
