//! Price API Adapter
//!
//! Implements the `PriceSource` port over HTTP against the CoinGecko
//! public API. No authentication, no retries.

pub mod coingecko;

pub use coingecko::{FetchError, HttpPriceSource, HttpPriceSourceConfig, COINGECKO_SIMPLE_PRICE_URL};
