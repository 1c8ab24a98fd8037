use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use parking_lot::RwLock;
use tokio::signal;

use bounty_audit::EventLog;
use bounty_config::MarketConfig;
use bounty_engine::{DistributionService, EngineConfig};
use bounty_rpc::RpcServer;
use bounty_store::MarketStore;

/// Bounty Marketplace Server
#[derive(Parser)]
#[command(name = "bounty-server", version, about = "Bounty marketplace service")]
struct Args {
    /// Path to the marketplace configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Override the JSON-RPC server port from the config
    #[arg(long)]
    rpc_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!("bounty marketplace server starting");

    // --- Load configuration ---
    tracing::info!(path = %args.config.display(), "loading config");
    let config = MarketConfig::from_file(&args.config).unwrap_or_else(|e| {
        tracing::warn!("Could not load config file: {e}, using defaults");
        MarketConfig::default()
    });

    config.validate().unwrap_or_else(|e| {
        tracing::error!("Config validation failed: {e}");
        std::process::exit(1);
    });

    tracing::info!(
        market = %config.market_name,
        currency = %config.currency,
        threshold = config.fairness_threshold,
        "config loaded"
    );

    // --- Restore persisted state ---
    std::fs::create_dir_all(&config.data_dir)?;

    let store = if config.store_path().exists() {
        let store = MarketStore::from_file(config.store_path()).unwrap_or_else(|e| {
            tracing::error!("Market store snapshot failed to load: {e}");
            std::process::exit(1);
        });
        tracing::info!(
            challenges = store.challenge_count(),
            payments = store.payment_count(),
            "market store restored"
        );
        store
    } else {
        tracing::info!("no market store snapshot, starting empty");
        MarketStore::new()
    };

    let events = if config.events_path().exists() {
        let events = EventLog::from_file(config.events_path()).unwrap_or_else(|e| {
            tracing::error!("Event log snapshot failed to load: {e}");
            std::process::exit(1);
        });
        tracing::info!(events = events.len(), "event log restored");
        events
    } else {
        tracing::info!("no event log snapshot, starting empty");
        EventLog::new()
    };

    // --- Assemble the engine ---
    let engine_config = EngineConfig {
        default_method: config.default_payment_method,
        fairness_threshold: config.fairness_threshold,
    };
    let service = Arc::new(DistributionService::new(
        Arc::new(RwLock::new(store)),
        Arc::new(RwLock::new(events)),
        engine_config,
    ));
    tracing::info!("distribution engine initialized");

    // --- Start RPC server ---
    let rpc_port = args.rpc_port.unwrap_or(config.rpc_port);
    let rpc_server = RpcServer::new(rpc_port, service.clone());
    tracing::info!(port = rpc_port, "starting RPC server");

    tokio::select! {
        // Run the RPC server.
        result = rpc_server.start() => {
            match result {
                Ok(addr) => tracing::info!(%addr, "RPC server stopped"),
                Err(e) => tracing::error!(error = %e, "RPC server error"),
            }
        }

        // Wait for shutdown signal (SIGINT/SIGTERM).
        _ = signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    // --- Persist state on the way out ---
    service.store().read().to_file(config.store_path())?;
    service.events().read().to_file(config.events_path())?;
    tracing::info!("state persisted, shutting down gracefully");

    Ok(())
}
