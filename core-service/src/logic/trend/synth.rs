//! Trend synthesis
//!
//! Projects the current portfolio figures over a fixed run of periods.
//! This is a display heuristic, not a forecast: every point is a pure
//! function of the base figures, the period index and one noise sample.

use serde::{Deserialize, Serialize};

use super::health::{MAX_HEALTH_SCORE, MIN_HEALTH_SCORE};
use super::noise::NoiseSource;
use crate::logic::round_to;

/// Period labels, oldest first
pub const DEFAULT_PERIODS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

pub const SCORE_DRIFT_PER_PERIOD: f64 = 0.05;
pub const CREDIT_DRIFT_PER_PERIOD: f64 = 2.0;
pub const DEFAULT_RATE_DRIFT_PER_PERIOD: f64 = 0.1;

/// Figures the trend is projected from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendBase {
    pub health_score: f64,
    pub avg_credit_score: f64,
    /// Percent, 0-100
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(rename = "month")]
    pub period: String,
    /// 1 dp, within [1, 10]
    pub score: f64,
    pub avg_credit: f64,
    pub default_rate: f64,
}

/// One point per label in `periods`
pub fn synthesize(
    base: &TrendBase,
    periods: &[&str],
    noise: &mut dyn NoiseSource,
) -> Vec<TrendPoint> {
    periods
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let i = i as f64;
            let raw = base.health_score + SCORE_DRIFT_PER_PERIOD * i + noise.sample();
            let score = if raw.is_finite() {
                raw.clamp(MIN_HEALTH_SCORE, MAX_HEALTH_SCORE)
            } else {
                base.health_score.clamp(MIN_HEALTH_SCORE, MAX_HEALTH_SCORE)
            };

            TrendPoint {
                period: label.to_string(),
                score: round_to(score, 1),
                avg_credit: round_to(base.avg_credit_score + CREDIT_DRIFT_PER_PERIOD * i, 0),
                default_rate: round_to(
                    (base.default_rate - DEFAULT_RATE_DRIFT_PER_PERIOD * i).max(0.0),
                    2,
                ),
            }
        })
        .collect()
}
