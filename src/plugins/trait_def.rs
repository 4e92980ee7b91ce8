//! Plugin trait definitions

use crate::application::errors::{CommandError, PluginError};
use crate::domain::entities::{CommandDescriptor, InboundMessage, ObserverFn};

/// Core plugin trait that all plugins must implement.
///
/// A plugin declares everything it contributes in [`register`]; nothing is
/// discovered by inspection.
///
/// [`register`]: Plugin::register
pub trait Plugin: Send + Sync {
    /// Short identifier, used in logs
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Declare commands, aliases, global command names and observers
    fn register(&self, registrar: &mut PluginRegistrar) -> Result<(), PluginError>;

    /// Called when the plugin is replaced by a reload
    fn shutdown(&self) {}
}

/// An all-message observer tagged with its owner
pub struct Observer {
    pub name: String,
    pub plugin: String,
    callback: ObserverFn,
}

impl Observer {
    pub fn notify(&self, message: &InboundMessage) -> Result<(), CommandError> {
        (self.callback)(message)
    }
}

/// Everything one plugin contributes to the command registry
pub struct Contribution {
    pub plugin: String,
    pub commands: Vec<CommandDescriptor>,
    pub aliases: Vec<(String, String)>,
    pub globals: Vec<String>,
    pub observers: Vec<Observer>,
}

/// Collects a plugin's declarations while it registers.
///
/// Nothing reaches the live registry until registration has completed, so a
/// plugin that fails half way leaves no trace.
pub struct PluginRegistrar {
    contribution: Contribution,
}

impl PluginRegistrar {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            contribution: Contribution {
                plugin: plugin.into(),
                commands: Vec::new(),
                aliases: Vec::new(),
                globals: Vec::new(),
                observers: Vec::new(),
            },
        }
    }

    pub fn plugin(&self) -> &str {
        &self.contribution.plugin
    }

    pub fn command(&mut self, command: CommandDescriptor) -> &mut Self {
        let command = command.owned_by(&self.contribution.plugin);
        self.contribution.commands.push(command);
        self
    }

    /// Rewrite `alias` to `target` when it is the first word of a message.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.contribution.aliases.push((alias.into(), target.into()));
        self
    }

    /// Make an existing directed command callable without addressing the bot.
    pub fn global(&mut self, name: impl Into<String>) -> &mut Self {
        self.contribution.globals.push(name.into());
        self
    }

    pub fn observer<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&InboundMessage) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.contribution.observers.push(Observer {
            name: name.into(),
            plugin: self.contribution.plugin.clone(),
            callback: Box::new(callback),
        });
        self
    }

    pub fn finish(self) -> Contribution {
        self.contribution
    }
}
