//! Use Cases Layer - Application Workflows
//!
//! Use cases:
//! - `PricePipeline`: one fetch → validate → clean → save tick
//! - `Scheduler`: runs the pipeline immediately, then on a fixed interval

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{PricePipeline, TickOutcome};
pub use scheduler::{Scheduler, DEFAULT_INTERVAL};
