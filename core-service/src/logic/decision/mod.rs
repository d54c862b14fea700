//! Decision Module - Risk Tiering
//!
//! Maps a default probability onto a risk tier and builds the final
//! prediction result.

pub mod engine;
pub mod threshold;
pub mod types;

pub use engine::DecisionEngine;
pub use threshold::ThresholdConfig;
pub use types::{PredictionResult, Recommendation, RiskTier};
