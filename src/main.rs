//! # Wildywatch CLI
//!
//! Discord notifier for Wilderness Flash Events: polls the event feed and
//! posts an hourly update at :55 UTC to every subscribed guild channel.
//!
//! Usage:
//!   wildywatch start                   # Run the bot
//!   wildywatch config show             # Show configuration
//!   wildywatch config reset            # Reset config to defaults
//!   wildywatch info                    # Show system info

mod commands;
mod health;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use wildywatch_channels::{DiscordChannel, DiscordConfig};
use wildywatch_core::traits::{EventFeed, NotifyTransport};
use wildywatch_core::WildywatchConfig;
use wildywatch_feed::FeedClient;
use wildywatch_scheduler::SchedulerEngine;
use wildywatch_store::SubscriptionStore;

use commands::{CommandContext, CommandReply};

#[derive(Parser)]
#[command(
    name = "wildywatch",
    version,
    about = "🌋 Wildywatch — Wilderness Flash Event notifications for Discord"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: gateway, command handling, hourly broadcasts
    Start,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system info
    Info,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Reset to defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wildywatch=debug,wildywatch_core=debug,wildywatch_scheduler=debug,wildywatch_channels=debug"
    } else {
        "wildywatch=info,wildywatch_scheduler=info,wildywatch_channels=info,wildywatch_store=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        WildywatchConfig::load_from(std::path::Path::new(path))?
    } else {
        WildywatchConfig::load()?
    };

    match cli.command {
        Commands::Start => start(config).await?,

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)?;
                println!("{content}");
            }
            ConfigAction::Reset => {
                let config = WildywatchConfig::default();
                config.save()?;
                println!("✅ Configuration reset to defaults.");
            }
        },

        Commands::Info => {
            println!("🌋 Wildywatch v{}", env!("CARGO_PKG_VERSION"));
            println!("   Platform: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
            println!("   Config: {}", WildywatchConfig::default_path().display());
            println!("   Feed: {}", config.feed.url);
            println!("   Broadcast minute: :{:02} UTC", config.schedule.broadcast_minute);
            println!(
                "   Subscriptions: {}",
                config.storage.subscriptions_path().display()
            );
        }
    }

    Ok(())
}

async fn start(config: WildywatchConfig) -> Result<()> {
    // Missing token is fatal — nothing works without the platform session.
    let token = config.resolve_token()?;

    let store = Arc::new(SubscriptionStore::load(
        config.storage.subscriptions_path(),
    )?);
    let feed: Arc<dyn EventFeed> = Arc::new(FeedClient::new(&config.feed)?);
    let channel = Arc::new(DiscordChannel::new(DiscordConfig::new(token)));

    health::spawn(config.health.clone());

    let me = channel.get_me().await?;
    tracing::info!(
        "✅ Logged in as {} — tracking {} server(s).",
        me.username,
        store.len().await
    );

    // Command sync failures are logged, not fatal — the bot still broadcasts.
    match channel.register_commands(&me.id).await {
        Ok(n) => tracing::info!("✅ Synced {n} slash commands with Discord."),
        Err(e) => tracing::error!("❌ Command sync error: {e}"),
    }

    let (ready_tx, ready_rx) = tokio::sync::watch::channel(false);
    let mut command_stream = Arc::clone(&channel).start_gateway(ready_tx);

    SchedulerEngine::new(
        Arc::clone(&feed),
        Arc::clone(&channel) as Arc<dyn NotifyTransport>,
        Arc::clone(&store),
        config.schedule.broadcast_minute,
    )
    .spawn(ready_rx);

    // Command loop — each invocation gets an explicit acknowledgment.
    let ctx = CommandContext {
        store: Arc::clone(&store),
        feed: Arc::clone(&feed),
    };
    let reply_channel = Arc::clone(&channel);
    tokio::spawn(async move {
        while let Some(inv) = command_stream.next().await {
            let reply = commands::handle(&inv, &ctx).await;
            let sent = match reply {
                CommandReply::Ephemeral(text) => {
                    reply_channel.reply_text(&inv, &text, true).await
                }
                CommandReply::Update(note) => {
                    reply_channel.reply_notification(&inv, &note).await
                }
            };
            if let Err(e) = sent {
                tracing::warn!("Failed to acknowledge {:?}: {e}", inv.command);
            }
        }
    });

    tracing::info!("Wildywatch is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    tracing::info!("👋 Shutting down.");
    Ok(())
}
