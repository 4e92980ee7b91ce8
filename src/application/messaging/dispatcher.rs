//! Message dispatcher - Routes messages to command handlers
//!
//! Per message: observers run first, then addressing is resolved, the
//! command word is alias-rewritten, a directed command is attempted, and
//! finally content commands are evaluated in registration order. Exactly
//! one handler's output becomes the reply.

use tracing::{debug, error, info, warn};

use super::addressing::AddressingPolicy;
use super::parser::split_command_word;
use crate::application::errors::{catch_panic, CommandError, PluginError};
use crate::application::services::{CommandRegistry, IdentityResolver, InstallReport};
use crate::domain::entities::{CommandDescriptor, ContentAction, HandlerContext, HandlerResult, InboundMessage};
use crate::domain::traits::StatusMessage;
use crate::plugins::PluginManager;

/// Reply sent when a handler fails
pub const DEFAULT_FAILURE_REPLY: &str = "Sorry, an unexpected error occurred while handling that message.";

const HELP_COMMAND: &str = "help";
const RELOAD_COMMAND: &str = "load_plugins";
/// Stands for the bot's mention alias in command descriptions
const NICKNAME_PLACEHOLDER: &str = "@NickName";

/// What happened to one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Empty body, nothing ran
    Ignored,
    /// No handler produced output
    Unhandled,
    Replied { command: String, reply: String },
    Failed { command: String, error: CommandError, reply: String },
}

impl DispatchOutcome {
    /// Text to send back, if any
    pub fn reply(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Replied { reply, .. } | DispatchOutcome::Failed { reply, .. } => Some(reply),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Replied { command, .. } | DispatchOutcome::Failed { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Message dispatcher - owns the registry and routes each message
pub struct Dispatcher {
    registry: CommandRegistry,
    plugins: PluginManager,
    plugin_paths: Vec<String>,
    resolver: IdentityResolver,
    addressing: AddressingPolicy,
    failure_reply: String,
}

impl Dispatcher {
    pub fn new(resolver: IdentityResolver, addressing: AddressingPolicy, plugins: PluginManager) -> Self {
        Self {
            registry: CommandRegistry::new(),
            plugins,
            plugin_paths: Vec::new(),
            resolver,
            addressing,
            failure_reply: DEFAULT_FAILURE_REPLY.to_string(),
        }
    }

    /// Plugin paths loaded, in order, by [`load_plugins`](Self::load_plugins)
    pub fn with_plugin_paths(mut self, paths: Vec<String>) -> Self {
        self.plugin_paths = paths;
        self
    }

    pub fn with_failure_reply(mut self, reply: impl Into<String>) -> Self {
        self.failure_reply = reply.into();
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn addressing(&self) -> &AddressingPolicy {
        &self.addressing
    }

    /// Load or reload every configured plugin
    pub fn load_plugins(&mut self) -> Vec<InstallReport> {
        let reports = self.registry.load_plugins(&mut self.plugins, &self.plugin_paths);
        info!("{} of {} plugins loaded", reports.len(), self.plugin_paths.len());
        reports
    }

    pub fn load_or_reload_plugin(&mut self, path: &str) -> Result<InstallReport, PluginError> {
        self.registry.load_or_reload_plugin(&mut self.plugins, path)
    }

    /// Route one message and return what should be sent back.
    pub fn dispatch(&mut self, mut message: InboundMessage) -> DispatchOutcome {
        debug!("Message from {} ({}): {}", message.origin, message.kind.as_str(), message.body);

        let raw = message.body.trim().to_string();
        if raw.is_empty() {
            return DispatchOutcome::Ignored;
        }

        self.notify_observers(&message);

        let (directed, stripped) = self.addressing.resolve(message.kind, &raw);
        message.mark_directed(directed);

        let body = {
            let (word, rest) = split_command_word(stripped);
            let canonical = self.registry.resolve_alias(word);
            if canonical != word {
                format!("{}{}", canonical, rest)
            } else {
                stripped.to_string()
            }
        };
        let (command, rest) = split_command_word(&body);
        let command = command.to_string();
        let args = rest.trim_start().to_string();

        if directed || self.registry.is_global(&command) {
            if let Some(outcome) = self.dispatch_builtin(&command) {
                return outcome;
            }
            if let Some(outcome) = self.dispatch_directed(&message, &command, &body, &args) {
                return outcome;
            }
        }

        if let Some(outcome) = self.dispatch_content(&message, &raw) {
            return outcome;
        }

        DispatchOutcome::Unhandled
    }

    fn notify_observers(&self, message: &InboundMessage) {
        for observer in self.registry.observers() {
            let failure = match catch_panic(|| observer.notify(message)) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("panicked: {}", panic),
            };
            error!(
                "An error happened while processing a message ({}) from {} in observer {} of {}: {}",
                message.kind.as_str(),
                message.origin,
                observer.name,
                observer.plugin,
                failure
            );
        }
    }

    fn dispatch_builtin(&mut self, command: &str) -> Option<DispatchOutcome> {
        let reply = match command {
            RELOAD_COMMAND => {
                self.load_plugins();
                "Reloading plugin modules and classes..".to_string()
            }
            HELP_COMMAND => self.help_text(),
            _ => return None,
        };
        Some(DispatchOutcome::Replied {
            command: command.to_string(),
            reply,
        })
    }

    fn help_text(&self) -> String {
        let commands = self.registry.visible_commands();
        if commands.is_empty() {
            return "No commands available".to_string();
        }
        let mut help = "Available commands:".to_string();
        for cmd in commands {
            match &cmd.description {
                Some(desc) => {
                    let desc = desc.replace(NICKNAME_PLACEHOLDER, self.addressing.mention_alias());
                    help.push_str(&format!("\n{} - {}", cmd.name, desc));
                }
                None => help.push_str(&format!("\n{}", cmd.name)),
            }
        }
        help
    }

    fn dispatch_directed(
        &self,
        message: &InboundMessage,
        command: &str,
        body: &str,
        args: &str,
    ) -> Option<DispatchOutcome> {
        let descriptor = self.registry.directed(command)?;
        let ctx = HandlerContext::new(message, &self.resolver, command, body, args);

        match invoke(descriptor, &ctx) {
            Ok(Some(text)) => {
                let reply = if descriptor.mention_sender && message.is_room_broadcast() {
                    format!("{} {}", ctx.sender_mention(), text)
                } else {
                    text
                };
                Some(DispatchOutcome::Replied {
                    command: command.to_string(),
                    reply,
                })
            }
            Ok(None) => None,
            Err(e) => Some(self.failed(message, descriptor, e)),
        }
    }

    fn dispatch_content(&self, message: &InboundMessage, raw: &str) -> Option<DispatchOutcome> {
        let directed = message.directed().unwrap_or(false);

        for descriptor in self.registry.content_commands() {
            if descriptor.filter.is_directed_only() && !directed {
                continue;
            }

            let mut captures = Vec::new();
            if let Some(pattern) = descriptor.filter.pattern() {
                if self.resolver.is_from_bot(&message.origin) {
                    continue;
                }
                let Some(found) = pattern.captures(raw) else {
                    continue;
                };
                captures = found
                    .iter()
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
            }

            let ctx = HandlerContext::new(message, &self.resolver, &descriptor.name, raw, "").with_captures(captures);
            match invoke(descriptor, &ctx) {
                Ok(Some(text)) => match &descriptor.action {
                    ContentAction::Reply => {
                        return Some(DispatchOutcome::Replied {
                            command: descriptor.name.clone(),
                            reply: text,
                        });
                    }
                    ContentAction::Status { color } => self.post_status(message, color, &text),
                },
                Ok(None) => {}
                Err(e) => return Some(self.failed(message, descriptor, e)),
            }
        }
        None
    }

    fn post_status(&self, message: &InboundMessage, color: &str, html: &str) {
        if !message.is_room_broadcast() {
            debug!("Status output for direct message from {} dropped", message.origin);
            return;
        }
        let room_id = self
            .resolver
            .resolve_room(&message.origin)
            .map(|room| room.id)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| message.origin.node().to_string());

        let status = StatusMessage::html(room_id, self.resolver.nickname(), color, html);
        if let Err(e) = self.resolver.directory().api().post_message(&status) {
            warn!("Failed to post status to {}: {}", message.origin.bare(), e);
        }
    }

    fn failed(&self, message: &InboundMessage, descriptor: &CommandDescriptor, error: CommandError) -> DispatchOutcome {
        error!(
            "Command {} from {} failed for message from {}: {}",
            descriptor.name, descriptor.plugin, message.origin, error
        );
        DispatchOutcome::Failed {
            command: descriptor.name.clone(),
            error,
            reply: self.failure_reply.clone(),
        }
    }
}

/// Run a handler, treating panics as errors and blank output as "not handled".
fn invoke(descriptor: &CommandDescriptor, ctx: &HandlerContext<'_>) -> HandlerResult {
    let result = catch_panic(|| descriptor.invoke(ctx)).unwrap_or_else(|panic| Err(CommandError::Panicked(panic)))?;
    Ok(result.filter(|text| !text.trim().is_empty()))
}
