use std::fmt;

use regex_lite::Regex;

use super::{InboundMessage, Room, User};
use crate::application::errors::{CommandError, PluginError};
use crate::application::services::{DirectoryCache, IdentityResolver};

/// Outcome of a handler: `Some` non-empty text is a reply, anything else
/// means "not handled".
pub type HandlerResult = Result<Option<String>, CommandError>;

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&HandlerContext<'_>) -> HandlerResult + Send + Sync>;

/// Observer invoked with every inbound message before routing
pub type ObserverFn = Box<dyn Fn(&InboundMessage) -> Result<(), CommandError> + Send + Sync>;

/// How a command is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Invoked by name when the message is directed at the bot
    Directed,
    /// Evaluated against messages in registration order, first reply wins
    Content,
    /// Invoked by name whether or not the message is directed at the bot
    Global,
}

impl CommandKind {
    pub fn as_str(&self) -> &str {
        match self {
            CommandKind::Directed => "directed",
            CommandKind::Content => "content",
            CommandKind::Global => "global",
        }
    }

    /// Directed and global commands share one name table.
    pub fn is_named(&self) -> bool {
        !matches!(self, CommandKind::Content)
    }
}

/// Gate applied before a content command runs
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pattern: Option<Regex>,
    directed_only: bool,
}

impl ContentFilter {
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn is_directed_only(&self) -> bool {
        self.directed_only
    }
}

/// What happens with a content command's output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentAction {
    /// Sent back as the reply
    #[default]
    Reply,
    /// Posted to the room as a colored status notice; never ends evaluation
    Status { color: String },
}

/// A command contributed by a plugin
pub struct CommandDescriptor {
    pub name: String,
    pub kind: CommandKind,
    pub description: Option<String>,
    pub hidden: bool,
    pub mention_sender: bool,
    pub filter: ContentFilter,
    pub action: ContentAction,
    /// Path of the plugin that registered this command
    pub plugin: String,
    handler: CommandHandler,
}

impl CommandDescriptor {
    pub fn new<F>(name: impl Into<String>, kind: CommandKind, handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            description: None,
            hidden: false,
            mention_sender: false,
            filter: ContentFilter::default(),
            action: ContentAction::default(),
            plugin: String::new(),
            handler: Box::new(handler),
        }
    }

    pub fn directed<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(name, CommandKind::Directed, handler)
    }

    pub fn global<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(name, CommandKind::Global, handler)
    }

    pub fn content<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(name, CommandKind::Content, handler)
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Keeps the command out of `help` listings.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Prefixes room replies with the sender's `@mention`.
    pub fn mention_sender(mut self) -> Self {
        self.mention_sender = true;
        self
    }

    /// Only run this content command for messages directed at the bot.
    pub fn directed_only(mut self) -> Self {
        self.filter.directed_only = true;
        self
    }

    /// Only run this content command when `pattern` is found in the body.
    /// Matching is case-insensitive.
    pub fn matching(mut self, pattern: &str) -> Result<Self, PluginError> {
        let regex = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| PluginError::Register(format!("invalid pattern for '{}': {}", self.name, e)))?;
        self.filter.pattern = Some(regex);
        Ok(self)
    }

    /// Post the output as a colored room status instead of replying.
    pub fn with_status(mut self, color: impl Into<String>) -> Self {
        self.action = ContentAction::Status { color: color.into() };
        self
    }

    pub(crate) fn owned_by(mut self, plugin: &str) -> Self {
        self.plugin = plugin.to_string();
        self
    }

    pub fn invoke(&self, ctx: &HandlerContext<'_>) -> HandlerResult {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("plugin", &self.plugin)
            .field("filter", &self.filter)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Everything a handler can see about the message it is invoked for
pub struct HandlerContext<'a> {
    pub message: &'a InboundMessage,
    /// Canonical command name, or the content command's name
    pub command: &'a str,
    /// Body after addressing was stripped and aliases were rewritten
    pub text: &'a str,
    /// Text following the command word
    pub args: &'a str,
    /// Capture groups of the content filter's match; index 0 is the whole match
    pub captures: Vec<String>,
    resolver: &'a IdentityResolver,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        message: &'a InboundMessage,
        resolver: &'a IdentityResolver,
        command: &'a str,
        text: &'a str,
        args: &'a str,
    ) -> Self {
        Self {
            message,
            command,
            text,
            args,
            captures: Vec::new(),
            resolver,
        }
    }

    pub fn with_captures(mut self, captures: Vec<String>) -> Self {
        self.captures = captures;
        self
    }

    /// Directory record of the sender, if it can be resolved
    pub fn sender(&self) -> Option<User> {
        self.resolver.resolve_sender(&self.message.origin)
    }

    /// Directory record of the room the message was posted in
    pub fn room(&self) -> Option<Room> {
        self.resolver.resolve_room(&self.message.origin)
    }

    /// `@mention` for the sender, falling back to the room nickname
    pub fn sender_mention(&self) -> String {
        match self.sender() {
            Some(user) => user.mention(),
            None => match self.message.origin.resource() {
                Some(nick) => format!("@{}", nick.replace(' ', "")),
                None => format!("@{}", self.message.origin.node()),
            },
        }
    }

    pub fn directory(&self) -> &DirectoryCache {
        self.resolver.directory()
    }

    pub fn resolver(&self) -> &IdentityResolver {
        self.resolver
    }
}
