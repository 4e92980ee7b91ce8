//! Administration API client over HTTP

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::errors::DirectoryError;
use crate::domain::traits::{AdminApi, StatusMessage, UnavailableAdminApi};
use crate::infrastructure::config::AdminConfig;

/// Blocking client for the room/user directory endpoints
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpAdminApi {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parley-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectoryError::Request(format!("Client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn list(&self, path: &str, key: &str) -> Result<Vec<Value>, DirectoryError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .query(&[("auth_token", self.token.as_str()), ("format", "json")])
            .send()
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Request(format!("{} returned {}", path, status)));
        }

        let body: Value = response
            .json()
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;
        records(body, key)
    }
}

impl AdminApi for HttpAdminApi {
    fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError> {
        self.list("rooms/list", "rooms")
    }

    fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
        self.list("users/list", "users")
    }

    fn post_message(&self, message: &StatusMessage) -> Result<(), DirectoryError> {
        let url = self.endpoint("rooms/message");
        debug!("POST {} (room {})", url, message.room_id);
        let response = self
            .client
            .post(&url)
            .query(&[("auth_token", self.token.as_str()), ("format", "json")])
            .form(message)
            .send()
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DirectoryError::Request(format!(
                "rooms/message returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Pull the record array stored under `key` out of a list response.
fn records(body: Value, key: &str) -> Result<Vec<Value>, DirectoryError> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(DirectoryError::Parse(format!("\"{}\" is not a list: {}", key, other))),
        },
        other => Err(DirectoryError::Parse(format!("expected an object, got {}", other))),
    }
}

fn normalize_base(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

/// Build the administration API from config; missing credentials or a
/// client that cannot be built leave the API unavailable.
pub fn connect(config: &AdminConfig) -> Arc<dyn AdminApi> {
    let Some((url, token)) = config.credentials() else {
        info!("No administration API configured, directory features disabled");
        return Arc::new(UnavailableAdminApi);
    };

    match HttpAdminApi::new(url, token, Duration::from_secs(config.timeout_seconds)) {
        Ok(api) => {
            info!("Administration API at {}", api.base_url());
            Arc::new(api)
        }
        Err(e) => {
            warn!("Administration API unavailable: {}", e);
            Arc::new(UnavailableAdminApi)
        }
    }
}
