//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies.
//!
//! Adapter categories:
//! - `api`: CoinGecko HTTP price source
//! - `metrics`: Prometheus metrics export and health checks
//! - `persistence`: SQLite price store

pub mod api;
pub mod metrics;
pub mod persistence;
