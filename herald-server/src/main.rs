//! Streak Herald Server
//!
//! Watches the games database for winners and new prize pools and
//! announces them to Discord, with a webhook surface for push-style
//! announcements from the game services.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::runtime::RuntimeConfig;
use config::{ConfigLoader, classify_config, get_database_url};
use herald_core::announce::{Announcer, AnnouncementSink, DiscordSink};
use herald_core::entities::GameKind;
use herald_core::poll::{EventClassifier, PgGameCatalog, PgPoolStream, PgWinnerStream, PollRunner};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Streak Herald - Discord announcer for game winners and prize pools
#[derive(Parser, Debug)]
#[command(name = "herald-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./herald-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:5000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting herald-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(args.config.clone(), args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // The announcer is the single delivery path for both the poll
    // runners and the webhook endpoints.
    let sink = DiscordSink::new(
        loaded_config.discord.winners_webhook_url.clone(),
        loaded_config.discord.new_pools_webhook_url.clone(),
    )?;
    let sink: Arc<dyn AnnouncementSink> = Arc::new(sink);
    let announcer = Arc::new(Announcer::new(sink));
    announcer
        .toggle_handle()
        .store(loaded_config.announce.enabled, Ordering::Relaxed);

    let thresholds = Arc::new(RwLock::new(classify_config(&loaded_config.announce)));
    let runtime_config = RuntimeConfig {
        announce_enabled: announcer.toggle_handle(),
        thresholds: thresholds.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Without a database URL the server still accepts webhook pushes,
    // it just does not poll.
    let db_pool = match get_database_url() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new().max_connections(5).connect_lazy(&url)?;
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running in webhook-only mode");
            None
        }
    };

    let mut runner_handles = Vec::new();
    if let Some(pool) = &db_pool {
        let polling = &loaded_config.polling;

        let winners = PollRunner::new(
            PgWinnerStream::new(pool.clone(), GameKind::GasStreaks),
            EventClassifier::without_catalog(),
            announcer.clone(),
            thresholds.clone(),
            Duration::from_secs(polling.winners_interval_secs),
            shutdown_rx.clone(),
        );
        runner_handles.push(tokio::spawn(winners.run()));

        let blitz = PollRunner::new(
            PgWinnerStream::new(pool.clone(), GameKind::Blitz),
            EventClassifier::without_catalog(),
            announcer.clone(),
            thresholds.clone(),
            Duration::from_secs(polling.blitz_interval_secs),
            shutdown_rx.clone(),
        );
        runner_handles.push(tokio::spawn(blitz.run()));

        let pools = PollRunner::new(
            PgPoolStream::new(pool.clone()),
            EventClassifier::with_catalog(PgGameCatalog::new(pool.clone())),
            announcer.clone(),
            thresholds.clone(),
            Duration::from_secs(polling.pools_interval_secs),
            shutdown_rx.clone(),
        );
        runner_handles.push(tokio::spawn(pools.run()));

        tracing::info!("Poll runners started");
    }

    let app_state = AppState {
        announcer,
        config: runtime_config.clone(),
    };

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(runtime_config, config_loader);

    let router = build_router(app_state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the background tasks before closing the pool.
    shutdown_notify.notify_one();
    let _ = shutdown_tx.send(true);
    for handle in runner_handles {
        let _ = handle.await;
    }

    if let Some(pool) = db_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
