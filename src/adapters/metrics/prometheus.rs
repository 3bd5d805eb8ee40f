//! Prometheus Metrics Registry - Pipeline Observability
//!
//! Counts tick outcomes and storage failures, tracks the last stored
//! price and fetch latency. All metrics use the `bitcoin_pipeline_*`
//! prefix.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::ports::metrics::TickMetrics;

/// Centralized Prometheus metrics for the price pipeline.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Ticks by outcome (`completed`, `fetch_failed`, `invalid`).
    pub ticks_total: IntCounterVec,
    /// Storage writes that failed and were swallowed.
    pub store_errors_total: IntCounter,
    /// Last price handed to the store (USD).
    pub last_price_usd: Gauge,
    /// Wall time spent in the fetch stage (seconds).
    pub fetch_latency_seconds: Histogram,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks_total = IntCounterVec::new(
            Opts::new("bitcoin_pipeline_ticks_total", "Pipeline ticks by outcome"),
            &["outcome"],
        )?;

        let store_errors_total = IntCounter::new(
            "bitcoin_pipeline_store_errors_total",
            "Price records that failed to persist",
        )?;

        let last_price_usd = Gauge::new(
            "bitcoin_pipeline_last_price_usd",
            "Most recent Bitcoin price handed to the store",
        )?;

        let fetch_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "bitcoin_pipeline_fetch_latency_seconds",
                "Price API fetch latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(store_errors_total.clone()))?;
        registry.register(Box::new(last_price_usd.clone()))?;
        registry.register(Box::new(fetch_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            store_errors_total,
            last_price_usd,
            fetch_latency_seconds,
        })
    }

    /// Ticks seen so far for an outcome label.
    pub fn ticks(&self, outcome: &str) -> u64 {
        self.ticks_total.with_label_values(&[outcome]).get()
    }

    /// Encode every registered metric in the text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl TickMetrics for MetricsRegistry {
    fn observe_fetch_latency(&self, seconds: f64) {
        self.fetch_latency_seconds.observe(seconds);
    }

    fn record_tick(&self, outcome: &str) {
        self.ticks_total.with_label_values(&[outcome]).inc();
    }

    fn record_stored_price(&self, price_usd: f64) {
        self.last_price_usd.set(price_usd);
    }

    fn record_store_error(&self) {
        self.store_errors_total.inc();
    }
}
