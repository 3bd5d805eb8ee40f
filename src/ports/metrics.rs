//! Metrics Port - Tick Instrumentation
//!
//! What the pipeline reports about each tick. The Prometheus adapter
//! implements it; tests can substitute a mock.

/// Outcome label for a tick that handed a record to the store.
pub const OUTCOME_COMPLETED: &str = "completed";
/// Outcome label for a tick whose fetch produced no data.
pub const OUTCOME_FETCH_FAILED: &str = "fetch_failed";
/// Outcome label for a tick whose response failed validation.
pub const OUTCOME_INVALID: &str = "invalid";

/// Sink for per-tick measurements.
pub trait TickMetrics: Send + Sync {
    /// Wall time spent in the fetch stage.
    fn observe_fetch_latency(&self, seconds: f64);

    /// Count one finished tick under an `OUTCOME_*` label.
    fn record_tick(&self, outcome: &str);

    /// A record at this price was persisted.
    fn record_stored_price(&self, price_usd: f64);

    /// A write failed and was swallowed.
    fn record_store_error(&self);
}
