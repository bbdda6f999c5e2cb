//! scrimbot - Discord scrim recruitment bot using Twilight
//!
//! Process bootstrap:
//! - Loads configuration from the environment
//! - Runs a single gateway shard with command/button dispatch
//! - Pumps session events back out as Discord messages
//! - Exposes health/ready endpoints and Prometheus metrics

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use twilight_gateway::{Config as ShardConfig, Shard, ShardId};

use scrimbot::config::BotConfig;
use scrimbot::discord::{self, BotContext, DiscordApi};
use scrimbot::health::{self, AppState};
use scrimbot::metrics::BotMetrics;
use scrimbot::session::SessionManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first to get log level
    let bot_config = BotConfig::from_env()?;

    // Initialize tracing with configured log level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("scrimbot={}", bot_config.log_level).parse()?)
                .add_directive("twilight_gateway=info".parse()?)
                .add_directive("twilight_http=warn".parse()?),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        lobby_channel_id = bot_config.lobby_channel_id,
        timeout_secs = bot_config.session_timeout.as_secs(),
        "Starting scrimbot"
    );

    // Initialize metrics
    let metrics = BotMetrics::new();
    info!("Prometheus metrics initialized");

    // Session core and its event stream
    let (session, session_events) = SessionManager::new(bot_config.session_timeout);

    // Discord HTTP adapter
    let api = Arc::new(DiscordApi::new(bot_config.discord_token.clone()));

    let gateway_connected = Arc::new(AtomicBool::new(false));

    // Pump session events out to Discord
    let pump = tokio::spawn(discord::run_event_pump(
        session_events,
        Arc::clone(&api),
        metrics.clone(),
        bot_config.lobby_channel_id,
    ));

    // Gateway shard
    let intents = BotConfig::intents();
    info!(?intents, "Using Discord intents");

    let shard = Shard::with_config(
        ShardId::ONE,
        ShardConfig::new(bot_config.discord_token.clone(), intents),
    );

    let ctx = BotContext {
        api: Arc::clone(&api),
        session: session.clone(),
        metrics: metrics.clone(),
        command_prefix: bot_config.command_prefix.clone(),
        lobby_channel_id: bot_config.lobby_channel_id,
        gateway_connected: Arc::clone(&gateway_connected),
    };

    // Start health server
    let app_state = AppState {
        session,
        metrics,
        gateway_connected,
    };

    let health_router = health::router(app_state);
    let addr: SocketAddr = ([0, 0, 0, 0], bot_config.http_port).into();

    info!(port = bot_config.http_port, "Starting HTTP server");

    let http_server = axum::serve(tokio::net::TcpListener::bind(addr).await?, health_router);

    // Run everything concurrently
    tokio::select! {
        result = discord::run(shard, ctx) => {
            if let Err(e) = result {
                error!(error = %e, "Gateway runner error");
            }
        }
        result = http_server => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Graceful shutdown
    info!("Shutting down scrimbot...");
    pump.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
