//! Explain Module - Top Factor Extraction
//!
//! Ranks features by the classifier's importances and reports the top
//! five with the applicant's submitted values.

pub mod engine;
pub mod types;

pub use engine::{explain, impact_of, rank_features, TOP_FACTOR_COUNT};
pub use types::{Impact, TopFactor};
