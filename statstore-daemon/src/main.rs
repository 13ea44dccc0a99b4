use anyhow::{Context, Result};
use clap::Parser;
use statstore_core::events::unix_now;
use statstore_core::store::{AzureTableClient, MemoryTableStore, TableStore};
use statstore_core::{observability, EventBus, SinkConfig, TableBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod ingest;

#[derive(Parser)]
#[command(name = "statstored")]
#[command(about = "Persists aggregated metrics snapshots to a remote table store", long_about = None)]
struct Cli {
    /// Path to the sink configuration file
    #[arg(short, long, env = "STATSTORE_CONFIG", default_value = "/etc/statstore/config.json")]
    config: PathBuf,

    /// Unix socket the aggregation engine delivers snapshots on
    #[arg(short, long, env = "STATSTORE_SOCKET", default_value = "/tmp/statstore.sock")]
    socket: PathBuf,

    /// Keep records in memory instead of the remote table service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize observability FIRST
    observability::init().map_err(|e| anyhow::anyhow!("observability init failed: {}", e))?;

    let cli = Cli::parse();

    info!("statstored starting");

    let config = match SinkConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %cli.config.display(), error = %e, "failed to load sink configuration");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn TableStore> = if cli.dry_run {
        info!("dry run: records stay in memory");
        Arc::new(MemoryTableStore::new())
    } else {
        match AzureTableClient::new(&config.account, &config.access_key, config.endpoint.as_deref())
        {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!(error = %e, "failed to build table client");
                std::process::exit(1);
            }
        }
    };

    let backend = match TableBackend::new(unix_now(), config, store) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            error!(error = %e, "refusing to start with incomplete configuration");
            std::process::exit(1);
        }
    };

    // Subscriptions are live from here on; table readiness is confirmed
    // below, so an early flush can race the table check and fail at write
    // time.
    let bus = EventBus::new();
    let event_loop = backend.clone().spawn(&bus);

    if let Err(e) = backend.init_table().await {
        error!(error = %e, "table initialization failed");
        std::process::exit(1);
    }

    let listener = ingest::bind(&cli.socket).context("failed to bind snapshot socket")?;
    let ingest_handle = tokio::spawn(ingest::run(listener, bus.clone()));

    info!(socket = %cli.socket.display(), "statstored ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");

    ingest_handle.abort();
    let _ = ingest_handle.await;
    event_loop.abort();
    let _ = event_loop.await;
    let _ = std::fs::remove_file(&cli.socket);

    info!("statstored shutting down");
    Ok(())
}
