//! Decision Engine
//!
//! Probability → tier → `PredictionResult`.

use super::threshold::ThresholdConfig;
use super::types::PredictionResult;
use crate::logic::explain::TopFactor;
use crate::logic::round_to;

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: ThresholdConfig,
}

impl DecisionEngine {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// `probability` must already lie in [0, 1]
    pub fn decide(&self, probability: f64, top_factors: Vec<TopFactor>) -> PredictionResult {
        let tier = self.thresholds.tier(probability);
        PredictionResult {
            prediction_probability: round_to(probability * 100.0, 2),
            assessment: tier.assessment().to_string(),
            recommendation: tier.recommendation(),
            top_factors,
            risk_level: tier,
        }
    }
}
