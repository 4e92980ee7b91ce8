//! Command registry - Active commands, aliases, global names and observers

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{error, info, warn};

use crate::application::errors::PluginError;
use crate::domain::entities::{CommandDescriptor, CommandKind};
use crate::plugins::{Contribution, Observer, PluginManager};

/// Names plugins may never register; the dispatcher owns them.
pub const RESERVED_COMMANDS: &[&str] = &["api", "help", "load_plugins"];

/// Summary of one plugin installation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub plugin: String,
    pub directed: usize,
    pub content: usize,
    pub aliases: usize,
    pub globals: usize,
    pub observers: usize,
    /// Commands, aliases and globals skipped because they used a reserved name
    pub rejected: Vec<String>,
}

/// Registry of everything plugins contribute.
///
/// Each plugin's contribution is replaced as a unit: installing a plugin
/// first drops whatever it registered before.
pub struct CommandRegistry {
    directed: HashMap<String, CommandDescriptor>,
    content: Vec<CommandDescriptor>,
    aliases: HashMap<String, (String, String)>,
    globals: HashMap<String, String>,
    observers: Vec<Observer>,
    reserved: HashSet<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::with_reserved(RESERVED_COMMANDS.iter().copied())
    }

    pub fn with_reserved<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            directed: HashMap::new(),
            content: Vec::new(),
            aliases: HashMap::new(),
            globals: HashMap::new(),
            observers: Vec::new(),
            reserved: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Import a plugin and swap its contribution in.
    ///
    /// On error nothing changes: the plugin's previous contribution (if any)
    /// and every other plugin's entries stay installed.
    pub fn load_or_reload_plugin(
        &mut self,
        manager: &mut PluginManager,
        path: &str,
    ) -> Result<InstallReport, PluginError> {
        let loaded = manager.load(path)?;
        let contribution = loaded.contribute(path)?;
        let report = self.install(contribution);
        // Old handlers are gone now, so the previous instance can go too.
        manager.retain(path, loaded);
        Ok(report)
    }

    /// Load or reload every path in order. Failures are logged and skipped.
    pub fn load_plugins(&mut self, manager: &mut PluginManager, paths: &[String]) -> Vec<InstallReport> {
        let mut reports = Vec::new();
        for path in paths {
            match self.load_or_reload_plugin(manager, path) {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping plugin {}: {}", path, e),
            }
        }
        reports
    }

    /// Replace a plugin's previous entries with `contribution`.
    pub fn install(&mut self, contribution: Contribution) -> InstallReport {
        let Contribution {
            plugin,
            commands,
            aliases,
            globals,
            observers,
        } = contribution;

        self.remove_plugin(&plugin);

        let mut report = InstallReport {
            plugin: plugin.clone(),
            ..InstallReport::default()
        };

        for command in commands {
            if self.reject_reserved(&plugin, &command.name, &mut report) {
                continue;
            }

            info!("command loaded: {} ({})", command.name, command.kind.as_str());
            if command.kind.is_named() {
                self.install_named(command);
                report.directed += 1;
            } else {
                self.install_content(command);
                report.content += 1;
            }
        }

        for (alias, target) in aliases {
            if self.reject_reserved(&plugin, &alias, &mut report) {
                continue;
            }
            self.aliases.insert(alias, (target, plugin.clone()));
            report.aliases += 1;
        }

        for name in globals {
            if self.reject_reserved(&plugin, &name, &mut report) {
                continue;
            }
            self.globals.insert(name, plugin.clone());
            report.globals += 1;
        }

        report.observers = observers.len();
        self.observers.extend(observers);

        info!(
            "Plugin {} installed: {} commands, {} content commands, {} rejected",
            plugin,
            report.directed,
            report.content,
            report.rejected.len()
        );
        report
    }

    /// Reserved names cover commands, alias words and global names alike.
    fn reject_reserved(&self, plugin: &str, name: &str, report: &mut InstallReport) -> bool {
        if !self.is_reserved(name) {
            return false;
        }
        error!(
            "Plugin \"{}\" attempted to register reserved name, skipping.. ({})",
            plugin,
            PluginError::ReservedName(name.to_string())
        );
        report.rejected.push(name.to_string());
        true
    }

    fn install_named(&mut self, command: CommandDescriptor) {
        if command.kind == CommandKind::Global {
            self.globals.insert(command.name.clone(), command.plugin.clone());
        }
        if let Some(previous) = self.directed.get(&command.name) {
            if previous.plugin != command.plugin {
                warn!(
                    "Command \"{}\" from {} replaces the one from {}",
                    command.name, command.plugin, previous.plugin
                );
            }
        }
        self.directed.insert(command.name.clone(), command);
    }

    fn install_content(&mut self, command: CommandDescriptor) {
        match self.content.iter().position(|c| c.name == command.name) {
            Some(index) => {
                warn!(
                    "Content command \"{}\" from {} replaces the one from {}",
                    command.name, command.plugin, self.content[index].plugin
                );
                self.content[index] = command;
            }
            None => self.content.push(command),
        }
    }

    /// Drop everything `plugin` registered. Returns the number of entries removed.
    pub fn remove_plugin(&mut self, plugin: &str) -> usize {
        let before = self.len();
        self.directed.retain(|_, c| c.plugin != plugin);
        self.content.retain(|c| c.plugin != plugin);
        self.aliases.retain(|_, (_, owner)| owner != plugin);
        self.globals.retain(|_, owner| owner != plugin);
        self.observers.retain(|o| o.plugin != plugin);
        before - self.len()
    }

    /// Canonical command name for `word`, or `word` itself.
    pub fn resolve_alias<'a>(&'a self, word: &'a str) -> &'a str {
        self.aliases
            .get(word)
            .map(|(target, _)| target.as_str())
            .unwrap_or(word)
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    pub fn directed(&self, name: &str) -> Option<&CommandDescriptor> {
        self.directed.get(name)
    }

    /// Content commands in evaluation order
    pub fn content_commands(&self) -> &[CommandDescriptor] {
        &self.content
    }

    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    /// Directed and global commands shown by `help`, sorted by name
    pub fn visible_commands(&self) -> Vec<&CommandDescriptor> {
        let mut commands: Vec<_> = self.directed.values().filter(|c| !c.hidden).collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Plugins with at least one installed entry
    pub fn plugins(&self) -> BTreeSet<&str> {
        self.directed
            .values()
            .map(|c| c.plugin.as_str())
            .chain(self.content.iter().map(|c| c.plugin.as_str()))
            .chain(self.aliases.values().map(|(_, p)| p.as_str()))
            .chain(self.globals.values().map(String::as_str))
            .chain(self.observers.iter().map(|o| o.plugin.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.directed.len() + self.content.len() + self.aliases.len() + self.globals.len() + self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginRegistrar;

    fn reply(text: &'static str) -> impl Fn(&crate::domain::entities::HandlerContext<'_>) -> crate::domain::entities::HandlerResult {
        move |_| Ok(Some(text.to_string()))
    }

    fn contribution(plugin: &str, build: impl FnOnce(&mut PluginRegistrar)) -> Contribution {
        let mut registrar = PluginRegistrar::new(plugin);
        build(&mut registrar);
        registrar.finish()
    }

    #[test]
    fn rejects_reserved_names_but_keeps_the_rest() {
        let mut registry = CommandRegistry::new();
        let report = registry.install(contribution("p", |r| {
            r.command(CommandDescriptor::directed("api", reply("x")))
                .command(CommandDescriptor::content("help", reply("x")))
                .command(CommandDescriptor::directed("status", reply("OK")));
        }));

        assert_eq!(report.rejected, vec!["api".to_string(), "help".to_string()]);
        assert!(registry.directed("api").is_none());
        assert!(registry.content_commands().is_empty());
        assert!(registry.directed("status").is_some());
    }

    #[test]
    fn rejects_reserved_alias_and_global_names() {
        let mut registry = CommandRegistry::new();
        let report = registry.install(contribution("p", |r| {
            r.command(CommandDescriptor::directed("fine", reply("fine")))
                .alias("help", "fine")
                .alias("!fine", "fine")
                .global("load_plugins")
                .global("fine");
        }));

        assert_eq!(report.rejected, vec!["help".to_string(), "load_plugins".to_string()]);
        assert_eq!(report.aliases, 1);
        assert_eq!(report.globals, 1);
        assert_eq!(registry.resolve_alias("help"), "help");
        assert_eq!(registry.resolve_alias("!fine"), "fine");
        assert!(!registry.is_global("load_plugins"));
        assert!(registry.is_global("fine"));
    }

    #[test]
    fn reinstall_replaces_only_that_plugin() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::directed("one", reply("1")))
                .command(CommandDescriptor::content("watch", reply("w")))
                .alias("!one", "one")
                .global("one")
                .observer("obs", |_| Ok(()));
        }));
        registry.install(contribution("b", |r| {
            r.command(CommandDescriptor::directed("two", reply("2")));
        }));

        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::directed("three", reply("3")));
        }));

        assert!(registry.directed("one").is_none());
        assert!(registry.directed("two").is_some());
        assert!(registry.directed("three").is_some());
        assert!(registry.content_commands().is_empty());
        assert_eq!(registry.resolve_alias("!one"), "!one");
        assert!(!registry.is_global("one"));
        assert!(registry.observers().is_empty());
    }

    #[test]
    fn reinstalled_content_commands_move_to_the_end() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::content("first", reply("1")));
        }));
        registry.install(contribution("b", |r| {
            r.command(CommandDescriptor::content("second", reply("2")));
        }));
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::content("first", reply("1")));
        }));

        let names: Vec<_> = registry.content_commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn content_name_collision_replaces_in_place() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::content("x", reply("a")))
                .command(CommandDescriptor::content("y", reply("a")));
        }));
        registry.install(contribution("b", |r| {
            r.command(CommandDescriptor::content("x", reply("b")));
        }));

        let owners: Vec<_> = registry
            .content_commands()
            .iter()
            .map(|c| (c.name.as_str(), c.plugin.as_str()))
            .collect();
        assert_eq!(owners, vec![("x", "b"), ("y", "a")]);
    }

    #[test]
    fn directed_name_collision_overwrites() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::directed("x", reply("a")));
        }));
        registry.install(contribution("b", |r| {
            r.command(CommandDescriptor::directed("x", reply("b")));
        }));
        assert_eq!(registry.directed("x").unwrap().plugin, "b");

        // Reloading the previous owner must not remove b's command.
        registry.install(contribution("a", |_| {}));
        assert_eq!(registry.directed("x").unwrap().plugin, "b");
    }

    #[test]
    fn alias_resolution_is_identity_for_unknown_words() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.alias("++", "karma");
        }));
        assert_eq!(registry.resolve_alias("++"), "karma");
        assert_eq!(registry.resolve_alias("karma"), "karma");
        assert_eq!(registry.resolve_alias("hello"), "hello");
    }

    #[test]
    fn global_kind_marks_name_global() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::global("weather", reply("sunny")));
        }));
        assert!(registry.is_global("weather"));
        assert!(registry.directed("weather").is_some());
    }

    #[test]
    fn help_listing_skips_hidden_commands() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::directed("zeta", reply("z")))
                .command(CommandDescriptor::directed("alpha", reply("a")))
                .command(CommandDescriptor::directed("secret", reply("s")).hidden());
        }));
        let names: Vec<_> = registry.visible_commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn remove_plugin_reports_count() {
        let mut registry = CommandRegistry::new();
        registry.install(contribution("a", |r| {
            r.command(CommandDescriptor::directed("x", reply("a"))).alias("!x", "x");
        }));
        assert_eq!(registry.plugins().into_iter().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(registry.remove_plugin("a"), 2);
        assert!(registry.is_empty());
    }
}
