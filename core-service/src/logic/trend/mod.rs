//! Trend Module - Portfolio Health Trends
//!
//! Grade-weighted health score plus a short synthesized series around it.
//! The series is for display only.
//!
//! ## Structure
//! - `health`: grade weights, health score
//! - `noise`: `NoiseSource` and its Gaussian / fixed implementations
//! - `synth`: per-period projection

pub mod health;
pub mod noise;
pub mod synth;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RiskResult;
use crate::logic::analytics::AggregationEngine;
use crate::logic::round_to;

pub use health::{grade_weight, health_score, GRADE_WEIGHTS};
pub use noise::{FixedNoise, GaussianNoise, NoiseSource};
pub use synth::{synthesize, TrendBase, TrendPoint, DEFAULT_PERIODS};

/// Figures the series was projected from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub health_score: f64,
    pub avg_credit_score: f64,
    pub default_rate: f64,
    pub total_loans: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTrends {
    pub portfolio_health: Vec<TrendPoint>,
    pub current_metrics: CurrentMetrics,
}

/// Builds `PortfolioTrends` from live aggregates
#[derive(Debug, Clone)]
pub struct TrendSynthesizer {
    noise_std: f64,
    seed: Option<u64>,
}

impl TrendSynthesizer {
    pub fn new(noise_std: f64, seed: Option<u64>) -> Self {
        Self { noise_std, seed }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.trend_noise_std, config.trend_seed)
    }

    /// Fresh Gaussian source per call; a fixed seed repeats the same series
    pub fn portfolio_trends(&self, engine: &AggregationEngine) -> RiskResult<PortfolioTrends> {
        let mut noise = GaussianNoise::new(self.noise_std, self.seed);
        self.portfolio_trends_with(engine, &mut noise)
    }

    pub fn portfolio_trends_with(
        &self,
        engine: &AggregationEngine,
        noise: &mut dyn NoiseSource,
    ) -> RiskResult<PortfolioTrends> {
        let base = engine.portfolio_base()?;
        let grades = engine.grade_counts()?;

        let grade_labels: Vec<(String, u64)> = grades
            .iter()
            .map(|g| (g.segment.to_string(), g.count))
            .collect();
        let score = health_score(grade_labels.iter().map(|(g, c)| (g.as_str(), *c)));

        let trend_base = TrendBase {
            health_score: score,
            avg_credit_score: base.avg_credit_score,
            default_rate: base.default_rate,
        };

        log::debug!(
            "Portfolio trend: health {:.2} over {} loans",
            score,
            base.total_loans
        );

        Ok(PortfolioTrends {
            portfolio_health: synthesize(&trend_base, &DEFAULT_PERIODS, noise),
            current_metrics: CurrentMetrics {
                health_score: round_to(score, 1),
                avg_credit_score: round_to(base.avg_credit_score, 0),
                default_rate: round_to(base.default_rate, 2),
                total_loans: base.total_loans,
            },
        })
    }
}

impl Default for TrendSynthesizer {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_TREND_NOISE_STD, None)
    }
}
