//! Order Cache - A read-through, write-through LRU cache for orders
//!
//! Serves point lookups by order UID from a bounded in-memory cache backed
//! by a durable store, with ingestion workers feeding writes through it.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_cache::api::create_router;
use order_cache::models::Order;
use order_cache::storage::{MemoryStore, RecordStore};
use order_cache::{spawn_ingest_workers, spawn_line_reader, AppState, Config};

/// Orders queued between the line reader and the workers, per worker
const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// Layout of the `SEED_FILE` document.
#[derive(Debug, Deserialize)]
struct SeedFile {
    /// Oldest first; the last order is the most recent
    orders: Vec<Order>,
}

/// Main entry point for the order cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the store, seeding it from `SEED_FILE` if set
/// 4. Create the cache and warm it up (fatal on failure)
/// 5. Start ingestion workers, fed from stdin when enabled
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_capacity={}, warmup_count={}, port={}, ingest_workers={}",
        config.cache_capacity, config.warmup_count, config.server_port, config.ingest_workers
    );

    let store = match &config.seed_file {
        Some(path) => {
            let orders = read_seed_file(path)?;
            info!("Store seeded with {} orders from {}", orders.len(), path.display());
            MemoryStore::from_records(orders)
        }
        None => MemoryStore::new(),
    };
    let store: Arc<dyn RecordStore<Order>> = Arc::new(store);

    let state = AppState::from_config(&config, store);
    info!("Cache layer initialized");

    // A cache that cannot establish its working set must not serve reads
    let loaded = match state.cache.warm_up(config.warmup_count).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "failed to load cache");
            return Err(e).context("cache warm-up failed");
        }
    };
    info!("Cache successfully populated from store: orders_loaded={}", loaded);

    let (tx, rx) = mpsc::channel(config.ingest_workers.max(1) * QUEUE_DEPTH_PER_WORKER);
    let mut background = spawn_ingest_workers(state.cache.clone(), rx, config.ingest_workers);
    if config.ingest_stdin {
        background.push(spawn_line_reader(BufReader::new(tokio::io::stdin()), tx));
        info!("Ingesting orders from stdin");
    } else {
        drop(tx);
        info!("No ingestion source configured");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Reads and validates the orders of a seed file.
fn read_seed_file(path: &Path) -> anyhow::Result<Vec<Order>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;

    for order in &seed.orders {
        if let Some(msg) = order.validate() {
            anyhow::bail!("invalid order {:?} in seed file: {}", order.order_uid, msg);
        }
    }
    Ok(seed.orders)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful shutdown.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in &background {
        handle.abort();
    }
    warn!("Ingestion tasks aborted");
}
