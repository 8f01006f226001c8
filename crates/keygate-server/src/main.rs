//! `keygate` server binary

use anyhow::Context;
use clap::Parser;
use keygate_core::{AuthConfig, ClockSource, SystemClock};
use keygate_server::{router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "keygate", version, about = "Wallet login and capability authentication server")]
struct Cli {
    /// TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address, overrides config and APP_BIND
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<AuthConfig> {
    let mut config = match &cli.config {
        Some(path) => AuthConfig::load_from_file(path)?,
        None => AuthConfig::default(),
    };
    config.merge_with_env()?;
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let clock: Arc<dyn ClockSource> = Arc::new(SystemClock::new());
    let state = AppState::from_config(&config, clock);

    let sessions = state.sessions.clone();
    let period = Duration::from_secs(config.server.prune_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            sessions.prune_expired();
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    tracing::info!(bind = %config.server.bind, audience = %config.ucan.audience, "Keygate listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
