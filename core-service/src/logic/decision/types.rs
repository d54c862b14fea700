//! Decision Types

use serde::{Deserialize, Serialize};

use crate::logic::explain::TopFactor;

/// Risk tier of a scored application. Assessment and recommendation are
/// read off the tier; it serializes as the lowercase risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn assessment(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::High => "HIGH RISK",
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        match self {
            RiskTier::Low => Recommendation::Approve,
            RiskTier::Medium => Recommendation::ManualReview,
            RiskTier::High => Recommendation::Deny,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.assessment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "APPROVE")]
    Approve,
    #[serde(rename = "MANUAL REVIEW")]
    ManualReview,
    #[serde(rename = "DENY")]
    Deny,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Approve => "APPROVE",
            Recommendation::ManualReview => "MANUAL REVIEW",
            Recommendation::Deny => "DENY",
        }
    }
}

/// Scoring outcome returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Default probability as a percentage, 2 dp
    pub prediction_probability: f64,
    pub assessment: String,
    pub recommendation: Recommendation,
    pub top_factors: Vec<TopFactor>,
    pub risk_level: RiskTier,
}
