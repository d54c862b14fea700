//! Decision Thresholds
//!
//! Probability cut points between risk tiers. A probability equal to a
//! cut point belongs to the higher tier.

use serde::{Deserialize, Serialize};

use super::types::RiskTier;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Below this: low risk
    pub medium_from: f64,
    /// At or above this: high risk
    pub high_from: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            medium_from: 0.15,
            high_from: 0.40,
        }
    }
}

impl ThresholdConfig {
    pub fn tier(&self, probability: f64) -> RiskTier {
        if probability < self.medium_from {
            RiskTier::Low
        } else if probability < self.high_from {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }
}
