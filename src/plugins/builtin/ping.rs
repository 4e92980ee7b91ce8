use crate::application::errors::PluginError;
use crate::domain::entities::CommandDescriptor;
use crate::plugins::{Plugin, PluginRegistrar};

/// Liveness and echo commands
pub struct PingPlugin;

impl Plugin for PingPlugin {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Liveness check and echo"
    }

    fn register(&self, registrar: &mut PluginRegistrar) -> Result<(), PluginError> {
        registrar
            .command(
                CommandDescriptor::directed("ping", |_| Ok(Some("pong".to_string())))
                    .with_description("Check the bot is alive"),
            )
            .command(
                CommandDescriptor::directed("echo", |ctx| {
                    let text = ctx.args.trim();
                    if text.is_empty() {
                        return Ok(Some("Usage: echo <text>".to_string()));
                    }
                    Ok(Some(text.to_string()))
                })
                .with_description("Repeat the given text")
                .mention_sender(),
            )
            .alias("!ping", "ping")
            .global("ping");
        Ok(())
    }
}
