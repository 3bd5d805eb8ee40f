//! Logging initialization.
//!
//! Every event is written twice: to the console (ANSI when attached to
//! a terminal) and appended, uncolored, to the configured log file.
//! Lines carry a local timestamp, the level and the message. Spans
//! opened by `#[instrument]` are kept out of both layers, so no span
//! context prefixes the message.
//!
//! `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Local timestamp with milliseconds, e.g. `2024-03-14 12:05:00.123`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log file can't be opened for appending or a global
/// subscriber is already set.
pub fn init_logging(default_level: &str, log_file: impl AsRef<Path>) -> Result<()> {
    let log_file = log_file.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_filter(filter_fn(|metadata| metadata.is_event()));

    let file_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(filter_fn(|metadata| metadata.is_event()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
