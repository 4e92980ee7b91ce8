//! Addressing policy - Decides whether a message is directed at the bot

use crate::domain::entities::{InboundMessage, MessageKind};

/// Recognises the markers that direct a room message at the bot.
///
/// Markers are tried in a fixed order: the broadcast marker (when enabled),
/// the mention alias as written, the short alias as written (when set),
/// then the mention alias ignoring case. The first one that matches wins. A marker only counts when whitespace
/// follows it.
#[derive(Debug, Clone)]
pub struct AddressingPolicy {
    mention_alias: String,
    short_alias: Option<String>,
    broadcast_marker: Option<String>,
}

impl AddressingPolicy {
    pub fn new(mention_alias: impl Into<String>) -> Self {
        Self {
            mention_alias: at_prefixed(mention_alias.into()),
            short_alias: None,
            broadcast_marker: None,
        }
    }

    /// Also accept a shorter case-sensitive alias such as `@parley`.
    pub fn with_short_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.short_alias = if alias.trim_start_matches('@').is_empty() {
            None
        } else {
            Some(at_prefixed(alias))
        };
        self
    }

    /// Also treat messages starting with `marker` (e.g. `@all`) as directed.
    pub fn with_broadcast_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        self.broadcast_marker = if marker.is_empty() { None } else { Some(marker) };
        self
    }

    pub fn mention_alias(&self) -> &str {
        &self.mention_alias
    }

    pub fn short_alias(&self) -> Option<&str> {
        self.short_alias.as_deref()
    }

    /// Returns whether `message` is directed at the bot, and its body with
    /// the addressing marker removed.
    pub fn is_directed_at_bot(&self, message: &InboundMessage) -> (bool, String) {
        let (directed, body) = self.resolve(message.kind, &message.body);
        (directed, body.to_string())
    }

    pub fn resolve<'a>(&self, kind: MessageKind, body: &'a str) -> (bool, &'a str) {
        if kind == MessageKind::Direct {
            return (true, body);
        }

        let stripped = self
            .broadcast_marker
            .as_deref()
            .and_then(|marker| strip_marker(body, marker, false))
            .or_else(|| strip_marker(body, &self.mention_alias, false))
            .or_else(|| {
                self.short_alias
                    .as_deref()
                    .and_then(|alias| strip_marker(body, alias, false))
            })
            .or_else(|| strip_marker(body, &self.mention_alias, true));

        match stripped {
            Some(rest) => (true, rest),
            None => (false, body),
        }
    }
}

fn at_prefixed(alias: String) -> String {
    if alias.starts_with('@') {
        alias
    } else {
        format!("@{}", alias)
    }
}

fn strip_marker<'a>(body: &'a str, marker: &str, ignore_case: bool) -> Option<&'a str> {
    let head = body.get(..marker.len())?;
    let matched = if ignore_case {
        head.to_lowercase() == marker.to_lowercase()
    } else {
        head == marker
    };
    if !matched {
        return None;
    }

    let rest = &body[marker.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}
