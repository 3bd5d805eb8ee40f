//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
  /// Parsed from this file.
  File(PathBuf),
  /// No file at this path; built-in defaults.
  Defaults(PathBuf),
}

/// A validated configuration and its origin.
///
/// Loading happens before the subscriber exists, so the summary is
/// logged separately through [`LoadedConfig::log_summary`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
  pub config: AppConfig,
  pub origin: ConfigOrigin,
}

impl LoadedConfig {
  /// Report the configuration origin. Call after logging is initialized.
  pub fn log_summary(&self) {
    match &self.origin {
      ConfigOrigin::File(path) => info!(
        path = %path.display(),
        interval_seconds = self.config.pipeline.interval_seconds,
        database = %self.config.persistence.database_path,
        "Configuration loaded successfully"
      ),
      ConfigOrigin::Defaults(path) => {
        info!(path = %path.display(), "No config file found, using defaults");
      }
    }
  }
}

/// Load and validate configuration from a TOML file.
///
/// A missing file is not an error: the defaults are returned.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<LoadedConfig> {
  let path = path.as_ref();

  if !path.exists() {
    return Ok(LoadedConfig {
      config: AppConfig::default(),
      origin: ConfigOrigin::Defaults(path.to_path_buf()),
    });
  }

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  Ok(LoadedConfig {
    config: parse_config(&content)?,
    origin: ConfigOrigin::File(path.to_path_buf()),
  })
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A positive tick interval, and a positive request timeout when set
/// - An http(s) price URL
/// - Non-empty file paths
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.pipeline.interval_seconds > 0,
    "interval_seconds must be positive"
  );
  anyhow::ensure!(
    !config.pipeline.log_file.trim().is_empty(),
    "log_file must not be empty"
  );

  let url = config.api.price_url.trim();
  anyhow::ensure!(
    url.starts_with("http://") || url.starts_with("https://"),
    "price_url must be an http(s) URL, got {url:?}"
  );
  if let Some(timeout) = config.api.timeout_seconds {
    anyhow::ensure!(timeout > 0, "timeout_seconds must be positive when set");
  }

  anyhow::ensure!(
    !config.persistence.database_path.trim().is_empty(),
    "database_path must not be empty"
  );

  if config.metrics.enabled {
    anyhow::ensure!(
      config.metrics.bind_address.parse::<std::net::SocketAddr>().is_ok(),
      "metrics bind_address must be host:port, got {:?}",
      config.metrics.bind_address
    );
  }

  Ok(())
}
