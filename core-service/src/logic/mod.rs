//! Logic Module - Risk Engines
//!
//! ## Structure
//! - `store/` - loan table access (`TabularStore`, SQLite adapter)
//! - `analytics/` - portfolio aggregates
//! - `trend/` - health score and display trend
//! - `features/` - application encoding
//! - `model/` - classifier artifacts and `ModelService`
//! - `explain/` - top factors
//! - `decision/` - risk tiers
//! - `scoring` - the per-application pipeline

pub mod analytics;
pub mod decision;
pub mod explain;
pub mod features;
pub mod model;
pub mod scoring;
pub mod store;
pub mod trend;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(27.3449, 2), 27.34);
        assert_eq!(round_to(685.4, 0), 685.0);
        assert_eq!(round_to(7.26, 1), 7.3);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }
}
