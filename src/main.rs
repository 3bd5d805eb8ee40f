//! Bitcoin Price Pipeline — Entry Point
//!
//! Wiring sequence:
//! 1. Load config.toml (defaults when absent) + validate
//! 2. Init tracing (console + append-only log file)
//! 3. Open the SQLite price store (single handle for the process)
//! 4. Create the CoinGecko HTTP price source
//! 5. Spawn health/metrics server when enabled
//! 6. Spawn the scheduler: one tick now, then every interval
//! 7. Wait for SIGINT → stop scheduler → close store

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use bitcoin_price_pipeline::adapters::api::{HttpPriceSource, HttpPriceSourceConfig};
use bitcoin_price_pipeline::adapters::metrics::{HealthServer, MetricsRegistry};
use bitcoin_price_pipeline::adapters::persistence::PriceStore;
use bitcoin_price_pipeline::config;
use bitcoin_price_pipeline::domain::SystemClock;
use bitcoin_price_pipeline::logging;
use bitcoin_price_pipeline::usecases::{PricePipeline, Scheduler};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let loaded = config::loader::load_config(CONFIG_PATH)
        .context("Failed to load configuration")?;
    let config = &loaded.config;

    // ── 2. Initialize logging ───────────────────────────────
    logging::init_logging(&config.pipeline.log_level, &config.pipeline.log_file)?;
    loaded.log_summary();

    info!(
        name = %config.pipeline.name,
        version = env!("CARGO_PKG_VERSION"),
        interval_seconds = config.pipeline.interval_seconds,
        "Starting Bitcoin price pipeline - running every {} seconds",
        config.pipeline.interval_seconds
    );

    // ── 3. Open the price store ─────────────────────────────
    let store = Arc::new(
        PriceStore::open(&config.persistence.database_path)
            .await
            .context("Failed to open price store")?,
    );

    // ── 4. Create the HTTP price source ─────────────────────
    let source = Arc::new(
        HttpPriceSource::new(HttpPriceSourceConfig {
            url: config.api.price_url.clone(),
            timeout: config.api.timeout_seconds.map(Duration::from_secs),
        })
        .context("Failed to create price source")?,
    );

    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 5. Health/metrics server ────────────────────────────
    let health_handle = if config.metrics.enabled {
        let server = HealthServer::new(
            Arc::clone(&store),
            Arc::clone(&metrics),
            config.metrics.bind_address.clone(),
        );
        let health_shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    // ── 6. Scheduler ────────────────────────────────────────
    let pipeline = PricePipeline::new(
        source,
        Arc::clone(&store),
        Arc::new(SystemClock),
        metrics,
    );
    let scheduler = Scheduler::new(Duration::from_secs(config.pipeline.interval_seconds));
    let scheduler_shutdown = shutdown_tx.subscribe();
    let scheduler_handle =
        tokio::spawn(async move { scheduler.run(&pipeline, scheduler_shutdown).await });

    // ── 7. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    // An in-flight tick finishes before the scheduler observes shutdown.
    match scheduler_handle.await {
        Ok(ticks) => info!(ticks, "Scheduler stopped"),
        Err(e) => error!(error = %e, "Scheduler task failed"),
    }

    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    store.close().await;
    info!("Shutdown complete");
    Ok(())
}
