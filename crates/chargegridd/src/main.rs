//! chargegridd — the ChargeGrid daemon.
//!
//! Single binary that assembles all ChargeGrid subsystems:
//! - State store (redb)
//! - Allocator loop
//! - REST API
//!
//! # Usage
//!
//! ```text
//! chargegridd standalone --config /etc/chargegrid/chargegrid.toml --port 8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chargegrid_allocator::{AllocationPolicy, Allocator};
use chargegrid_core::ChargeGridConfig;
use chargegrid_state::StateStore;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,chargegridd=debug,chargegrid=debug";

#[derive(Parser)]
#[command(name = "chargegridd", about = "ChargeGrid daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the allocator and the API in one process.
    Standalone {
        /// TOML configuration file; built-in defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for persistent state (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Command::Standalone {
            config,
            port,
            data_dir,
        } => {
            let config = load_config(config, port, data_dir)?;
            run_standalone(config).await
        }
    }
}

/// Read the config file (if any) and apply command-line overrides.
fn load_config(
    path: Option<PathBuf>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<ChargeGridConfig> {
    let mut config = match path {
        Some(path) => ChargeGridConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ChargeGridConfig::default(),
    };
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.server.data_dir = data_dir;
    }
    config.validate()?;
    Ok(config)
}

async fn run_standalone(config: ChargeGridConfig) -> anyhow::Result<()> {
    info!("ChargeGrid daemon starting in standalone mode");

    // Ensure data directory exists.
    std::fs::create_dir_all(&config.server.data_dir)
        .with_context(|| format!("creating {}", config.server.data_dir.display()))?;
    let db_path = config.server.data_dir.join("chargegrid.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let policy = AllocationPolicy::from_config(&config.allocator)?;
    let allocator = Arc::new(Allocator::new(store.clone(), policy));
    info!(
        interval_secs = config.allocator.interval_secs,
        end_of_workday_hour = config.allocator.end_of_workday_hour,
        "allocator initialized"
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let interval = Duration::from_secs(config.allocator.interval_secs);
    let loop_allocator = allocator.clone();
    let allocator_handle = tokio::spawn(async move {
        loop_allocator.run(interval, shutdown_rx).await;
    });

    // ── Start API server ───────────────────────────────────────

    let router = chargegrid_api::build_router(store, allocator);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for the allocator to finish its current cycle.
    let _ = allocator_handle.await;

    info!("ChargeGrid daemon stopped");
    Ok(())
}
