//! ensemble - HTTP backend for a multi-character conversation sandbox

mod api;
mod config;
mod error;
mod state;

use anyhow::Context;
use clap::Parser;
use ensemble_ai::ChaiClient;
use ensemble_core::CharacterSandbox;
use std::{path::PathBuf, sync::Arc};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use state::AppState;

const DEFAULT_LOG_FILTER: &str =
    "ensemble_server=info,ensemble_core=info,ensemble_ai=info,tower_http=info";
const VERBOSE_LOG_FILTER: &str =
    "ensemble_server=debug,ensemble_core=debug,ensemble_ai=debug,tower_http=debug";

/// ensemble - multi-character conversation sandbox server
#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind (overrides ENSEMBLE_HOST and the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides ENSEMBLE_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    init_tracing(args.verbose);

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env: {}", e),
    }

    if args.init_config {
        let path = Config::init().context("Failed to create config file")?;
        println!("Config file created at: {}", path.display());
        println!("\nExample config:\n{}", config::example_config());
        return Ok(());
    }

    let mut cfg = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    cfg.apply_env_overrides();
    if let Some(host) = args.host {
        cfg.server.host = host;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    info!("Starting ensemble server");

    let client = ChaiClient::from_env(cfg.client_config())
        .context("Failed to configure inference client")?;
    let sandbox = CharacterSandbox::new(Arc::new(client), cfg.sandbox_config());
    let state = AppState::new(sandbox);

    let app = api::create_router(state, &cfg.server)?;

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
