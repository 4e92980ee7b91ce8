//! Plugin loader - Dynamically loads plugins from shared libraries

use std::path::Path;

use libloading::{Library, Symbol};

use crate::application::errors::PluginError;
use crate::plugins::{LoadedPlugin, Plugin};

/// Exported symbol every plugin library must provide
pub const PLUGIN_INIT_SYMBOL: &[u8] = b"parley_plugin_init";

/// Function signature for plugin initialization.
///
/// Returns a heap-allocated `Box<dyn Plugin>` the loader takes ownership of.
/// The library must be built against the same crate version and compiler.
pub type PluginInitFn = unsafe extern "C" fn() -> *mut Box<dyn Plugin>;

/// Whether `path` names a shared library rather than a built-in plugin
pub fn is_library_path(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("so") | Some("dylib") | Some("dll")
    )
}

/// Load a single plugin from a shared library
pub fn load_library(path: &str) -> Result<LoadedPlugin, PluginError> {
    let library_path = Path::new(path);
    if !library_path.exists() {
        return Err(PluginError::Load(format!("Library not found: {}", library_path.display())));
    }

    // Load the library
    let library = unsafe {
        Library::new(library_path).map_err(|e| PluginError::Load(format!("Failed to load library: {}", e)))?
    };

    // Initialize the plugin
    let plugin = unsafe {
        let init_fn: Symbol<PluginInitFn> = library
            .get(PLUGIN_INIT_SYMBOL)
            .map_err(|e| PluginError::Load(format!("Failed to find init function: {}", e)))?;

        let plugin_ptr = init_fn();
        if plugin_ptr.is_null() {
            return Err(PluginError::Load("Plugin init returned null".to_string()));
        }
        *Box::from_raw(plugin_ptr)
    };

    tracing::info!("Loaded plugin library: {} ({})", plugin.name(), library_path.display());

    Ok(LoadedPlugin::from_library(plugin, library))
}
