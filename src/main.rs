//! order-notify CLI
//!
//! Run the notification pipeline over a change-event feed, inspect the
//! cursor, or fire a manual test message.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use order_notify::{
    AppConfig, ConsoleChannel, CursorStore, HttpGatewayChannel, HttpGatewayConfig,
    IdempotencyGate, JsonlFeed, MessageChannel, NotificationDispatcher, Pipeline, SendOutcome,
};

#[derive(Parser)]
#[command(name = "order-notify")]
#[command(about = "WhatsApp notifications for food order lifecycle events")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/order-notify/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume a JSONL change-event feed and send notifications
    Run {
        /// Feed file, one change event per line
        feed: PathBuf,
        /// Print messages instead of sending; cursor stays untouched
        #[arg(long)]
        dry_run: bool,
        /// Cursor file override
        #[arg(long)]
        cursor: Option<PathBuf>,
    },
    /// Show the persisted cursor
    Cursor {
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Cursor file override
        #[arg(long)]
        cursor: Option<PathBuf>,
    },
    /// Send a one-off test message
    Send {
        /// Local phone digits (country code comes from config)
        phone: String,
        /// Message text
        text: String,
        /// Print instead of sending
        #[arg(long)]
        dry_run: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
}

fn cursor_store(config: &AppConfig, override_path: Option<PathBuf>) -> CursorStore {
    let path = override_path
        .or_else(|| config.cursor_path.clone())
        .unwrap_or_else(CursorStore::default_path);
    CursorStore::new(path)
}

fn build_channel(config: &AppConfig, dry_run: bool) -> Result<Arc<dyn MessageChannel>> {
    if dry_run {
        return Ok(Arc::new(ConsoleChannel::dry_run()));
    }
    match &config.gateway_url {
        Some(url) => {
            let channel = HttpGatewayChannel::new(HttpGatewayConfig {
                url: url.clone(),
                token: config.gateway_token.clone(),
                request_timeout: config.send_timeout(),
            })?;
            Ok(Arc::new(channel))
        }
        None => {
            info!("no gateway configured, printing messages to console");
            Ok(Arc::new(ConsoleChannel::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log level via RUST_LOG, info by default.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("order_notify=info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run {
            feed,
            dry_run,
            cursor,
        } => {
            let store = cursor_store(&config, cursor);
            info!(cursor = %store.path().display(), feed = %feed.display(), "starting pipeline");

            let gate = Arc::new(IdempotencyGate::new(store));
            let channel = build_channel(&config, dry_run)?;
            let dispatcher = Arc::new(
                NotificationDispatcher::new(channel, config.country_code.clone())
                    .with_send_timeout(config.send_timeout()),
            );

            let rx = JsonlFeed::new(feed).spawn().await?;
            Pipeline::new(gate, dispatcher).run(rx).await?;
        }
        Commands::Cursor { json, cursor } => {
            let store = cursor_store(&config, cursor);
            let state = store.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("cursor file: {}", store.path().display());
                match Utc.timestamp_millis_opt(state.watermark).single() {
                    Some(when) if state.watermark > 0 => {
                        println!("watermark:   {} ({})", state.watermark, when.to_rfc3339());
                    }
                    _ => println!("watermark:   {}", state.watermark),
                }
                println!("orders:      {}", state.processed.len());
                let mut keys: Vec<_> = state.processed.iter().collect();
                keys.sort_by(|a, b| a.0.cmp(b.0));
                for (key, marks) in keys {
                    let statuses: Vec<_> = marks.statuses.iter().map(|s| s.as_str()).collect();
                    println!(
                        "  {key}: created={} statuses=[{}]",
                        marks.created,
                        statuses.join(", ")
                    );
                }
            }
        }
        Commands::Send {
            phone,
            text,
            dry_run,
        } => {
            let channel = build_channel(&config, dry_run)?;
            let dispatcher =
                NotificationDispatcher::new(Arc::clone(&channel), config.country_code.clone());
            let address = dispatcher.resolve_address(&phone)?;

            let outcome = tokio::task::spawn_blocking(move || channel.send(&address, &text))
                .await??;
            match outcome {
                SendOutcome::Sent => info!("message sent"),
                SendOutcome::Skipped(reason) => info!(reason = %reason, "message skipped"),
                SendOutcome::Failed(cause) => anyhow::bail!("send failed: {cause}"),
            }
        }
    }

    Ok(())
}
