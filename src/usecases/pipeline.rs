//! Price Pipeline - One Tick of Fetch, Validate, Clean, Save
//!
//! A tick either aborts (no data or invalid shape) or completes
//! (record built and handed to the store). Storage failures are
//! swallowed by the repository, so a completed tick may still have
//! persisted nothing; `TickOutcome::Completed::persisted` says which.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, instrument};

use crate::domain::quote::{validate, ValidationError};
use crate::domain::record::{clean_data, Clock, PriceRecord};
use crate::ports::metrics::{TickMetrics, OUTCOME_COMPLETED, OUTCOME_FETCH_FAILED, OUTCOME_INVALID};
use crate::ports::price_source::PriceSource;
use crate::ports::repository::PriceRepository;

/// Terminal state of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fetch or validation failed; nothing was written.
    Aborted(ValidationError),
    /// A record was built and handed to the store.
    Completed {
        record: PriceRecord,
        /// Whether the store accepted the write.
        persisted: bool,
    },
}

impl TickOutcome {
    /// Whether the tick reached the store.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Wires a price source, a repository and a clock into the ETL tick.
pub struct PricePipeline<S: PriceSource, R: PriceRepository> {
    /// Quote provider.
    source: Arc<S>,
    /// Record storage.
    repository: Arc<R>,
    /// Timestamp source for new records.
    clock: Arc<dyn Clock>,
    /// Tick counters.
    metrics: Arc<dyn TickMetrics>,
}

impl<S: PriceSource, R: PriceRepository> PricePipeline<S, R> {
    /// Create a new pipeline.
    pub fn new(
        source: Arc<S>,
        repository: Arc<R>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn TickMetrics>,
    ) -> Self {
        Self {
            source,
            repository,
            clock,
            metrics,
        }
    }

    /// Run a single tick.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> TickOutcome {
        let started = Instant::now();
        let raw = self.source.fetch().await;
        self.metrics.observe_fetch_latency(started.elapsed().as_secs_f64());

        let quote = match validate(raw.as_ref()) {
            Ok(quote) => quote,
            Err(reason) => {
                error!("Validation failed: {reason}");
                let outcome = if reason.is_fetch_failure() {
                    OUTCOME_FETCH_FAILED
                } else {
                    OUTCOME_INVALID
                };
                self.metrics.record_tick(outcome);
                return TickOutcome::Aborted(reason);
            }
        };

        let record = clean_data(quote, self.clock.as_ref());
        let persisted = self.repository.save(&record).await;

        if persisted {
            self.metrics.record_stored_price(record.price_usd);
        } else {
            self.metrics.record_store_error();
        }
        self.metrics.record_tick(OUTCOME_COMPLETED);

        TickOutcome::Completed { record, persisted }
    }
}
