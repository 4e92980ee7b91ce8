//! Plugin system
//!
//! Plugins contribute commands, aliases, global command names and observers
//! through an explicit registration call. They are either compiled in
//! (`builtin.<name>`) or loaded from a shared library.

pub mod builtin;
pub mod manager;
pub mod trait_def;

pub use manager::{LoadedPlugin, PluginFactory, PluginInfo, PluginManager};
pub use trait_def::{Contribution, Observer, Plugin, PluginRegistrar};
