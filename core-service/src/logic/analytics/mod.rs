//! Analytics Module - Portfolio Aggregation
//!
//! Grouped aggregates over the loan table: KPI summary, loan analytics,
//! risk analytics and single-key distributions.
//!
//! ## Structure
//! - `buckets`: FICO credit buckets
//! - `segments`: accepted grouping keys
//! - `types`: result records
//! - `engine`: `AggregationEngine`

pub mod buckets;
pub mod engine;
pub mod segments;
pub mod types;

#[cfg(test)]
mod tests;

pub use buckets::CreditBucket;
pub use engine::{default_rate, AggregationEngine};
pub use segments::SegmentKey;
pub use types::*;
