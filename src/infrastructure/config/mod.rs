//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::application::messaging::DEFAULT_FAILURE_REPLY;
use crate::domain::entities::Address;
use crate::plugins::builtin::BUILTIN_PLUGINS;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub bot: BotConfig,
    pub keepalive: KeepaliveConfig,
    pub plugins: PluginsConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConnectionConfig {
    /// The bot's own address
    pub jid: String,
    pub password: Option<String>,
    pub nickname: String,
    /// Rooms joined on start
    pub rooms: Vec<String>,
    pub room_domain: String,
    pub user_domain: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    /// Defaults to `@` plus the nickname without spaces
    pub mention_alias: Option<String>,
    /// Case-sensitive short alias; defaults to `@` plus the lowercased
    /// first word of the nickname
    pub short_alias: Option<String>,
    /// Also treat room messages starting with the broadcast marker as directed
    pub respond_to_all: bool,
    pub broadcast_marker: String,
    pub failure_reply: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct KeepaliveConfig {
    /// 0 disables the keepalive
    pub idle_seconds: u64,
    pub poll_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginsConfig {
    /// Plugin paths, loaded in order
    pub load: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdminConfig {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            jid: "1_bot@chat.example.com".to_string(),
            password: None,
            nickname: "Parley Bot".to_string(),
            rooms: Vec::new(),
            room_domain: "conf.example.com".to_string(),
            user_domain: "chat.example.com".to_string(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            mention_alias: None,
            short_alias: None,
            respond_to_all: false,
            broadcast_marker: "@all".to_string(),
            failure_reply: DEFAULT_FAILURE_REPLY.to_string(),
        }
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            idle_seconds: 50,
            poll_seconds: 5,
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            load: BUILTIN_PLUGINS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout_seconds: 10,
        }
    }
}

impl AdminConfig {
    /// Base url and token, when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.base_url.as_deref().filter(|u| !u.is_empty())?;
        let token = self.api_token.as_deref().filter(|t| !t.is_empty())?;
        Some((url, token))
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `BOT_PASSWORD`, `BOT_NICKNAME` and `ADMIN_API_TOKEN` as found by `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup("BOT_PASSWORD") {
            self.connection.password = Some(password);
        }
        if let Some(nickname) = lookup("BOT_NICKNAME") {
            self.connection.nickname = nickname;
        }
        if let Some(token) = lookup("ADMIN_API_TOKEN") {
            self.admin.api_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bot_address()?;
        self.room_addresses()?;
        if self.connection.nickname.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.nickname".to_string()));
        }
        if self.connection.room_domain.is_empty() {
            return Err(ConfigError::MissingField("connection.room-domain".to_string()));
        }
        if self.keepalive.idle_seconds > 0 && self.keepalive.poll_seconds == 0 {
            return Err(ConfigError::InvalidValue("keepalive.poll-seconds must be positive".to_string()));
        }
        Ok(())
    }

    pub fn bot_address(&self) -> Result<Address, ConfigError> {
        if self.connection.jid.is_empty() {
            return Err(ConfigError::MissingField("connection.jid".to_string()));
        }
        self.connection
            .jid
            .parse()
            .map_err(|e| ConfigError::InvalidValue(format!("connection.jid: {}", e)))
    }

    pub fn room_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        self.connection
            .rooms
            .iter()
            .map(|room| {
                room.parse::<Address>()
                    .map(|address| address.bare())
                    .map_err(|e| ConfigError::InvalidValue(format!("room {}: {}", room, e)))
            })
            .collect()
    }

    pub fn mention_alias(&self) -> String {
        match self.bot.mention_alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => format!("@{}", self.connection.nickname.replace(' ', "")),
        }
    }

    pub fn short_alias(&self) -> String {
        match self.bot.short_alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => {
                let first = self.connection.nickname.split_whitespace().next().unwrap_or_default();
                format!("@{}", first.to_lowercase())
            }
        }
    }

    /// Marker for broadcast addressing, only when `respond-to-all` is on
    pub fn broadcast_marker(&self) -> Option<&str> {
        if self.bot.respond_to_all && !self.bot.broadcast_marker.is_empty() {
            Some(&self.bot.broadcast_marker)
        } else {
            None
        }
    }

    /// Account prefix shared by user addresses: the first `_`-separated
    /// part of the bot's node
    pub fn account_prefix(&self) -> Option<String> {
        let address = self.bot_address().ok()?;
        let node = address.node();
        let (prefix, _) = node.split_once('_')?;
        Some(prefix.to_string())
    }
}
