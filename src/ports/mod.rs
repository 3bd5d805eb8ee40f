//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the pipeline requires from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceSource`: fetching the raw quote document
//! - `PriceRepository`: persisting normalized price records
//! - `TickMetrics`: reporting tick outcomes and latencies

pub mod metrics;
pub mod price_source;
pub mod repository;

pub use metrics::TickMetrics;
pub use price_source::PriceSource;
pub use repository::PriceRepository;
