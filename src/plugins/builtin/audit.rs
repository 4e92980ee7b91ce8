use tracing::debug;

use crate::application::errors::PluginError;
use crate::plugins::{Plugin, PluginRegistrar};

/// Logs every inbound message
pub struct AuditPlugin;

impl Plugin for AuditPlugin {
    fn name(&self) -> &str {
        "audit"
    }

    fn register(&self, registrar: &mut PluginRegistrar) -> Result<(), PluginError> {
        registrar.observer("log", |message| {
            let preview: String = message.body.chars().take(50).collect();
            debug!("[{}] {} {}", message.kind.as_str(), message.origin, preview);
            Ok(())
        });
        Ok(())
    }
}
