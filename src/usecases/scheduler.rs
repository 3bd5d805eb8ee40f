//! Tick Scheduler - Fixed-interval Pipeline Driver
//!
//! Runs the pipeline once immediately, then once per interval, until
//! shutdown. Each tick is awaited inside the loop, so two ticks never
//! overlap; a tick that overruns the interval delays the next one
//! instead of triggering a burst.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument};

use super::pipeline::PricePipeline;
use crate::ports::price_source::PriceSource;
use crate::ports::repository::PriceRepository;

/// Default cadence: every five minutes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Drives a [`PricePipeline`] on a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Scheduler {
    /// Create a scheduler. `period` must be non-zero.
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Time between tick starts.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Run ticks until `shutdown_rx` fires or its sender is dropped.
    ///
    /// Returns the number of ticks executed.
    #[instrument(skip(self, pipeline, shutdown_rx), fields(period_secs = self.period.as_secs()))]
    pub async fn run<S, R>(
        &self,
        pipeline: &PricePipeline<S, R>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> u64
    where
        S: PriceSource,
        R: PriceRepository,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!(ticks, "Scheduler received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    let outcome = pipeline.run_once().await;
                    debug!(tick = ticks, completed = outcome.is_completed(), "Tick finished");
                }
            }
        }

        ticks
    }
}
