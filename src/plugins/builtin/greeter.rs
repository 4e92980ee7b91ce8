use crate::application::errors::PluginError;
use crate::domain::entities::CommandDescriptor;
use crate::plugins::{Plugin, PluginRegistrar};

/// Passive room commentary
pub struct GreeterPlugin;

impl Plugin for GreeterPlugin {
    fn name(&self) -> &str {
        "greeter"
    }

    fn description(&self) -> &str {
        "Greets the room and announces shipped work"
    }

    fn register(&self, registrar: &mut PluginRegistrar) -> Result<(), PluginError> {
        registrar
            .command(
                CommandDescriptor::content("greet", |ctx| Ok(Some(format!("{} hello!", ctx.sender_mention()))))
                    .matching(r"\b(hello|hi|hey)\s+(everyone|all|folks)\b")?,
            )
            .command(
                CommandDescriptor::content("shipped", |ctx| {
                    let who = ctx
                        .sender()
                        .map(|u| u.display_name().to_string())
                        .or_else(|| ctx.message.origin.resource().map(str::to_string))
                        .unwrap_or_default();
                    let verb = ctx.captures.get(1).cloned().unwrap_or_default();
                    Ok(Some(format!("<b>{}</b> {} something", who, verb)))
                })
                .matching(r"\b(deployed|shipped)\b")?
                .with_status("green"),
            );
        Ok(())
    }
}
