use crate::application::errors::PluginError;
use crate::domain::entities::CommandDescriptor;
use crate::plugins::{Plugin, PluginRegistrar};

/// Commands that read the room/user directory
pub struct DirectoryPlugin;

impl Plugin for DirectoryPlugin {
    fn name(&self) -> &str {
        "directory"
    }

    fn description(&self) -> &str {
        "Room and user lookups"
    }

    fn register(&self, registrar: &mut PluginRegistrar) -> Result<(), PluginError> {
        registrar
            .command(
                CommandDescriptor::directed("whoami", |ctx| {
                    Ok(Some(match ctx.sender() {
                        Some(user) => format!("you are {} ({})", user, user.address),
                        None => "I don't know who you are yet".to_string(),
                    }))
                })
                .with_description("Show your directory entry")
                .mention_sender(),
            )
            .command(
                CommandDescriptor::directed("whois", |ctx| {
                    let name = ctx.args.trim();
                    if name.is_empty() {
                        return Ok(Some("Usage: whois <display name>".to_string()));
                    }
                    Ok(Some(match ctx.directory().user_by_display_name(name) {
                        Some(user) => format!("{} is {} ({})", user, user.mention(), user.address),
                        None => format!("No user named {}", name),
                    }))
                })
                .with_description("Look up a user by display name"),
            )
            .command(
                CommandDescriptor::directed("rooms", |ctx| {
                    let rooms = ctx.directory().rooms();
                    if rooms.is_empty() {
                        return Ok(Some("No rooms known".to_string()));
                    }
                    let mut names: Vec<_> = rooms.values().map(|r| r.name.as_str()).collect();
                    names.sort_unstable();
                    Ok(Some(names.join(", ")))
                })
                .with_description("List known rooms"),
            )
            .command(
                CommandDescriptor::directed("refresh", |ctx| {
                    ctx.directory().refresh();
                    Ok(Some("Directory refreshed".to_string()))
                })
                .hidden(),
            );
        Ok(())
    }
}
