//! Price quote decoding — the validation gate of every tick.
//!
//! The price API answers with an untyped JSON document. Before anything
//! is persisted it must decode into a [`BitcoinQuote`]. Decoding walks the
//! document in a fixed order and stops at the first structural problem,
//! reporting it as a [`ValidationError`] whose message is stable: the
//! reason strings are part of the job's observable log output.

use serde_json::Value;
use thiserror::Error;

/// Raw response body as returned by the price API.
pub type RawResponse = Value;

/// Reason reported when a response passes every check.
pub const VALID_REASON: &str = "Data is valid";

/// Top-level key holding the Bitcoin quote.
const BITCOIN_KEY: &str = "bitcoin";

/// Key holding the USD price inside the Bitcoin quote.
const USD_KEY: &str = "usd";

/// A Bitcoin spot quote that survived validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitcoinQuote {
    /// Spot price in US dollars.
    pub usd: f64,
}

/// Structural problems found in a price API response, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The fetch produced nothing (network error, bad status, bad body).
    #[error("No data received")]
    NoData,
    /// The body is JSON but not an object.
    #[error("Data is not a dictionary")]
    NotAnObject,
    #[error("Missing 'bitcoin' key")]
    MissingBitcoin,
    #[error("'bitcoin' value is not a dictionary")]
    BitcoinNotAnObject,
    #[error("Missing 'usd' key")]
    MissingUsd,
    /// `usd` is present but is a string, bool, null, array or object.
    #[error("'usd' value is not a number")]
    UsdNotANumber,
}

impl ValidationError {
    /// Whether the tick failed before any data arrived.
    pub const fn is_fetch_failure(self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Decode a raw response into a typed quote.
///
/// Checks run in order and short-circuit:
/// presence, object, `bitcoin` key, `bitcoin` object, `usd` key,
/// `usd` numeric. Integers and floats are both accepted; JSON booleans
/// are not numbers.
pub fn validate(data: Option<&RawResponse>) -> Result<BitcoinQuote, ValidationError> {
    let data = data.ok_or(ValidationError::NoData)?;
    let root = data.as_object().ok_or(ValidationError::NotAnObject)?;

    let bitcoin = root
        .get(BITCOIN_KEY)
        .ok_or(ValidationError::MissingBitcoin)?
        .as_object()
        .ok_or(ValidationError::BitcoinNotAnObject)?;

    let usd = bitcoin
        .get(USD_KEY)
        .ok_or(ValidationError::MissingUsd)?
        .as_f64()
        .ok_or(ValidationError::UsdNotANumber)?;

    Ok(BitcoinQuote { usd })
}

/// Verdict form of [`validate`]: `(is_valid, reason)`.
pub fn validate_data(data: Option<&RawResponse>) -> (bool, String) {
    match validate(data) {
        Ok(_) => (true, VALID_REASON.to_string()),
        Err(e) => (false, e.to_string()),
    }
}
