//! Normalized price records and the transform that produces them.

use chrono::{Local, NaiveDateTime};

use super::quote::BitcoinQuote;

/// ISO-8601 local timestamp, microsecond precision, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One persisted price observation.
///
/// `timestamp` is the primary key in the store; records are never
/// mutated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// Generation time, formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Bitcoin spot price in US dollars.
    pub price_usd: f64,
}

impl PriceRecord {
    /// Build a record for a quote observed at `observed_at`.
    pub fn new(quote: BitcoinQuote, observed_at: NaiveDateTime) -> Self {
        Self {
            timestamp: observed_at.format(TIMESTAMP_FORMAT).to_string(),
            price_usd: quote.usd,
        }
    }

    /// Parse the timestamp back into a datetime.
    pub fn observed_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Attach a generation timestamp to a validated quote.
pub fn clean_data(quote: BitcoinQuote, clock: &dyn Clock) -> PriceRecord {
    PriceRecord::new(quote, clock.now())
}
