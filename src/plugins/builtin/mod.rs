//! Plugins compiled into the bot, addressed as `builtin.<name>`

pub mod audit;
pub mod directory;
pub mod greeter;
pub mod ping;

use super::{Plugin, PluginManager};

/// Paths of every built-in plugin
pub const BUILTIN_PLUGINS: &[&str] = &["builtin.audit", "builtin.directory", "builtin.greeter", "builtin.ping"];

pub fn register_all(manager: &mut PluginManager) {
    manager.register_factory("builtin.audit", || Ok(Box::new(audit::AuditPlugin) as Box<dyn Plugin>));
    manager.register_factory("builtin.directory", || Ok(Box::new(directory::DirectoryPlugin) as Box<dyn Plugin>));
    manager.register_factory("builtin.greeter", || Ok(Box::new(greeter::GreeterPlugin) as Box<dyn Plugin>));
    manager.register_factory("builtin.ping", || Ok(Box::new(ping::PingPlugin) as Box<dyn Plugin>));
}
