use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::time::Duration;

use parley_bot::application::errors::BotError;
use parley_bot::application::messaging::{AddressingPolicy, Dispatcher, MessageParser};
use parley_bot::application::services::{
    BotService, DirectoryCache, IdentityResolver, KeepaliveSettings, UserAddressing,
};
use parley_bot::domain::entities::Address;
use parley_bot::infrastructure::adapters::ConsoleAdapter;
use parley_bot::infrastructure::admin;
use parley_bot::infrastructure::config::Config;
use parley_bot::plugins::PluginManager;

#[derive(Parser)]
#[command(name = "parley-bot")]
#[command(about = "A plugin-driven groupchat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Default log level (RUST_LOG directives take precedence)
    #[arg(short, long, default_value = "info")]
    log_level: tracing::Level,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Write a default config file
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level.into()))
        .init();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("parley-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        tracing::info!("No config at {}, using defaults", config_path);
        Config::default()
    };
    config.apply_env();
    config
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = load_config(config_path);
    config.validate()?;

    let bot_address = config.bot_address()?;
    let nickname = config.connection.nickname.clone();
    tracing::info!("Starting parley-bot as {} ({})", nickname, bot_address);

    // The blocking HTTP client must be built outside the async runtime.
    let api = admin::connect(&config.admin);
    let directory = DirectoryCache::new(
        api,
        UserAddressing::new(config.account_prefix(), config.connection.user_domain.clone()),
    );
    let resolver = IdentityResolver::new(Arc::new(directory), config.connection.room_domain.clone(), nickname);

    let mut addressing = AddressingPolicy::new(config.mention_alias()).with_short_alias(config.short_alias());
    if let Some(marker) = config.broadcast_marker() {
        addressing = addressing.with_broadcast_marker(marker);
    }

    let mut dispatcher = Dispatcher::new(resolver, addressing, PluginManager::with_builtins())
        .with_plugin_paths(config.plugins.load.clone())
        .with_failure_reply(config.bot.failure_reply.clone());
    let reports = dispatcher.load_plugins();
    tracing::info!(
        "Plugin system initialized with {} plugins, {} registry entries",
        reports.len(),
        dispatcher.registry().len()
    );

    let console_user = Address::new("console", config.connection.user_domain.clone());
    let transport = ConsoleAdapter::new(MessageParser::new(config.connection.room_domain.clone()), console_user);

    let mut service = BotService::new(Arc::new(transport), dispatcher)
        .with_rooms(config.room_addresses()?)
        .with_keepalive(KeepaliveSettings {
            target: bot_address.bare(),
            idle: Duration::from_secs(config.keepalive.idle_seconds),
            poll: Duration::from_secs(config.keepalive.poll_seconds.max(1)),
        });

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    let result = rt.block_on(service.run());
    drop(rt);
    drop(service);
    result
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if Path::new(config_path).exists() {
        return Err(BotError::Internal(format!("{} already exists, not overwriting", config_path)));
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, &yaml)
        .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", config_path, e)))?;
    println!("{}", yaml);
    println!("\nWritten to {}. Adjust as needed.", config_path);
    Ok(())
}
