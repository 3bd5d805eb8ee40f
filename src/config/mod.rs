//! Configuration Module - TOML-based Pipeline Configuration
//!
//! Loads and validates configuration from `config.toml`. Every field
//! has a default, and a missing file means "all defaults": fetch
//! CoinGecko every five minutes into `bitcoin_prices.db`, logging to
//! `pipeline.log` and the console.

pub mod loader;

use serde::Deserialize;

use crate::adapters::api::coingecko::COINGECKO_SIMPLE_PRICE_URL;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Scheduling and logging.
  pub pipeline: PipelineConfig,
  /// Price API endpoint.
  pub api: ApiConfig,
  /// Database location.
  pub persistence: PersistenceConfig,
  /// Metrics and health endpoints.
  pub metrics: MetricsConfig,
}

/// Pipeline identity, cadence and logging.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Human-readable job name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  pub log_level: String,
  /// Append-only log file, written alongside the console.
  pub log_file: String,
  /// Seconds between tick starts.
  pub interval_seconds: u64,
}

/// Price API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Full quote URL, query string included.
  pub price_url: String,
  /// Request timeout in seconds; unset leaves the HTTP client's default.
  pub timeout_seconds: Option<u64>,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
  /// SQLite database file.
  pub database_path: String,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Serve /live, /ready and /metrics.
  pub enabled: bool,
  /// Server bind address.
  pub bind_address: String,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      name: "bitcoin-price-pipeline".to_string(),
      log_level: "info".to_string(),
      log_file: "pipeline.log".to_string(),
      interval_seconds: 300,
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      price_url: COINGECKO_SIMPLE_PRICE_URL.to_string(),
      timeout_seconds: None,
    }
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      database_path: "bitcoin_prices.db".to_string(),
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      bind_address: "0.0.0.0:9090".to_string(),
    }
  }
}
