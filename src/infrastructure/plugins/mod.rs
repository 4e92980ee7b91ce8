//! Plugin loading from shared libraries
//!
//! A library exports `parley_plugin_init`, which hands back a boxed
//! `Plugin`. The library stays loaded for as long as the plugin lives.

pub mod loader;

pub use loader::{is_library_path, load_library, PluginInitFn, PLUGIN_INIT_SYMBOL};
