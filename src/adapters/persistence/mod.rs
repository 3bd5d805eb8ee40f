//! Persistence Adapters - SQLite Price Storage
//!
//! Implements the `PriceRepository` port on a local SQLite file with a
//! single `prices(timestamp TEXT PRIMARY KEY, price_usd REAL)` table.

pub mod sqlite;

pub use sqlite::{PriceStore, StoreError, StoreResult};
