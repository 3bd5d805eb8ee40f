//! Repository Port - Price Record Persistence
//!
//! Defines the storage contract for normalized price records.
//! Records are keyed by their timestamp and written with
//! insert-or-replace semantics, so the store only ever grows.

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::record::PriceRecord;

/// Trait for price record storage providers.
#[async_trait]
pub trait PriceRepository: Send + Sync + 'static {
    /// Insert or replace the row keyed by `record.timestamp`.
    ///
    /// The write is committed before this returns.
    async fn upsert(&self, record: &PriceRecord) -> anyhow::Result<()>;

    /// Load every record, oldest first.
    async fn load_all(&self) -> anyhow::Result<Vec<PriceRecord>>;

    /// Most recent record by timestamp, if any.
    async fn latest(&self) -> anyhow::Result<Option<PriceRecord>>;

    /// Number of stored records.
    async fn count(&self) -> anyhow::Result<u64>;

    /// Check if the backing store is reachable.
    async fn is_healthy(&self) -> bool;

    /// Persist a record, logging the outcome.
    ///
    /// Storage failures are logged and swallowed; the return value only
    /// reports whether the row was written.
    async fn save(&self, record: &PriceRecord) -> bool {
        match self.upsert(record).await {
            Ok(()) => {
                info!(
                    "Data saved: {} USD at {}",
                    record.price_usd, record.timestamp
                );
                true
            }
            Err(e) => {
                error!("Database error: {e:#}");
                false
            }
        }
    }
}
