//! Price Source Port - One-shot Quote Retrieval
//!
//! Defines the trait the pipeline uses to obtain the raw price
//! document for a tick. Transport details (HTTP, status handling,
//! body decoding) stay inside the adapter.

use async_trait::async_trait;

use crate::domain::quote::RawResponse;

/// Trait for price quote providers.
///
/// A fetch either yields the decoded response body or `None`. Failures
/// are logged by the implementor and never retried within a tick.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    /// Fetch the current quote document.
    async fn fetch(&self) -> Option<RawResponse>;
}
