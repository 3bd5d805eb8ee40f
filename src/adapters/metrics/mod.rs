//! Metrics and Monitoring Adapters
//!
//! Prometheus counters for tick outcomes plus an optional axum server
//! exposing /live, /ready and /metrics.

pub mod health;
pub mod prometheus;

pub use health::HealthServer;
pub use prometheus::MetricsRegistry;
