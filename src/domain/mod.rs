//! Domain layer - price quotes and records.
//!
//! Pure logic only: decoding the API document into a typed quote and
//! normalizing it into a timestamped record. No I/O happens here.

pub mod quote;
pub mod record;

pub use quote::{validate, validate_data, BitcoinQuote, RawResponse, ValidationError, VALID_REASON};
pub use record::{clean_data, Clock, PriceRecord, SystemClock, TIMESTAMP_FORMAT};
