//! Plugin manager - resolves plugin paths to live instances

use std::collections::HashMap;

use libloading::Library;
use tracing::{debug, info};

use crate::application::errors::{catch_panic, PluginError};
use crate::infrastructure::plugins::loader;
use crate::plugins::trait_def::{Contribution, Plugin, PluginRegistrar};

/// Builds a fresh plugin instance
pub type PluginFactory = Box<dyn Fn() -> Result<Box<dyn Plugin>, PluginError> + Send + Sync>;

/// A plugin instance, plus the library its code lives in when it was
/// loaded from disk.
pub struct LoadedPlugin {
    // Field order matters: the instance must drop before its library.
    plugin: Box<dyn Plugin>,
    library: Option<Library>,
}

impl LoadedPlugin {
    pub fn new(plugin: Box<dyn Plugin>) -> Self {
        Self { plugin, library: None }
    }

    pub(crate) fn from_library(plugin: Box<dyn Plugin>, library: Library) -> Self {
        Self {
            plugin,
            library: Some(library),
        }
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    pub fn is_library(&self) -> bool {
        self.library.is_some()
    }

    /// Run the plugin's registration against a fresh registrar.
    pub fn contribute(&self, path: &str) -> Result<Contribution, PluginError> {
        let mut registrar = PluginRegistrar::new(path);
        match catch_panic(|| self.plugin.register(&mut registrar)) {
            Ok(Ok(())) => Ok(registrar.finish()),
            Ok(Err(e)) => Err(e),
            Err(panic) => Err(PluginError::Register(format!("{} panicked: {}", path, panic))),
        }
    }
}

/// Manages all plugins for the bot
pub struct PluginManager {
    factories: HashMap<String, PluginFactory>,
    loaded: HashMap<String, LoadedPlugin>,
}

impl PluginManager {
    /// A manager that knows no plugins yet
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            loaded: HashMap::new(),
        }
    }

    /// A manager that knows the built-in plugins
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        crate::plugins::builtin::register_all(&mut manager);
        manager
    }

    /// Make `path` resolve to plugins built by `factory`.
    pub fn register_factory<F>(&mut self, path: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Plugin>, PluginError> + Send + Sync + 'static,
    {
        let path = path.into();
        debug!("Plugin factory registered: {}", path);
        self.factories.insert(path, Box::new(factory));
    }

    /// Import and instantiate the plugin at `path`.
    ///
    /// Does not touch plugins that are already loaded.
    pub fn load(&self, path: &str) -> Result<LoadedPlugin, PluginError> {
        if let Some(factory) = self.factories.get(path) {
            let plugin = catch_panic(factory)
                .map_err(|panic| PluginError::Load(format!("{} panicked: {}", path, panic)))??;
            info!("Loaded plugin: {} ({})", plugin.name(), path);
            return Ok(LoadedPlugin::new(plugin));
        }

        if loader::is_library_path(path) {
            return loader::load_library(path);
        }

        Err(PluginError::NotFound(path.to_string()))
    }

    /// Keep `loaded` as the live instance for `path`, shutting down the one
    /// it replaces.
    pub fn retain(&mut self, path: &str, loaded: LoadedPlugin) {
        if let Some(previous) = self.loaded.insert(path.to_string(), loaded) {
            previous.plugin.shutdown();
            info!("Replaced plugin instance: {}", path);
        }
    }

    /// Check if a plugin is loaded
    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded.contains_key(path)
    }

    /// List all loaded plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        let mut plugins: Vec<_> = self
            .loaded
            .iter()
            .map(|(path, loaded)| PluginInfo {
                path: path.clone(),
                name: loaded.plugin.name().to_string(),
                description: loaded.plugin.description().to_string(),
            })
            .collect();
        plugins.sort_by(|a, b| a.path.cmp(&b.path));
        plugins
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub path: String,
    pub name: String,
    pub description: String,
}
