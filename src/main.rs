//! Algorand asset manager (v1)
//!
//! An HTTP service that creates and destroys assets on an Algorand network.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum) ──▶ assets::AssetLifecycle
//!                                          │
//!              ┌───────────────────────────┼──────────────────────────┐
//!              ▼                           ▼                          ▼
//!        assets::lease              blockchain::transaction     assets::registry
//!        (ephemeral key)            (build, sign, encode)       (JSON file)
//!              │                           │
//!              ▼                           ▼
//!        kmd (key daemon)           algod (ledger node)
//!
//!     Cross-cutting: config, observability, resilience, lifecycle
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;

use asset_manager::assets::{AssetLifecycle, AssetRegistry, JsonFileRegistry, MemoryRegistry, SigningIdentity};
use asset_manager::blockchain::{AlgodClient, KeyDaemon, KmdClient, LedgerNode};
use asset_manager::config::loader::{load_config, signing_mnemonic};
use asset_manager::config::AssetManagerConfig;
use asset_manager::http::{AppState, HttpServer};
use asset_manager::lifecycle::{signals, Shutdown};
use asset_manager::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "asset-manager")]
#[command(about = "Create and destroy Algorand assets over HTTP", long_about = None)]
struct Args {
    /// Path to the TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AssetManagerConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("asset-manager v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        algod = %config.algod.url,
        kmd = %config.kmd.url,
        wallet = %config.signing.wallet_name,
        confirmation_timeout_secs = config.confirmation.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let identity = SigningIdentity::new(
        signing_mnemonic(&config)?,
        config.signing.wallet_name.clone(),
        config.signing.wallet_password.clone(),
    );

    let node: Arc<dyn LedgerNode> = Arc::new(AlgodClient::new(config.algod.clone())?);
    let daemon: Arc<dyn KeyDaemon> = Arc::new(KmdClient::new(config.kmd.clone())?);
    let registry: Arc<dyn AssetRegistry> = if config.registry.path.is_empty() {
        tracing::warn!("No registry path configured, created assets are kept in memory only");
        Arc::new(MemoryRegistry::new())
    } else {
        Arc::new(JsonFileRegistry::open(&config.registry.path)?)
    };

    let lifecycle = Arc::new(AssetLifecycle::new(
        node,
        daemon.clone(),
        registry,
        &config.confirmation,
    ));

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let state = AppState {
        lifecycle,
        daemon,
        identity: Arc::new(identity),
        shutdown,
        confirmation_timeout: Duration::from_secs(config.confirmation.timeout_secs),
        runs: TaskTracker::new(),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(state, &config.listener);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
