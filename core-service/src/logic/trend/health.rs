//! Portfolio health score
//!
//! Count-weighted mean of per-grade weights, on a 1-10 scale.

/// Weight of a grade the table doesn't list
pub const UNKNOWN_GRADE_WEIGHT: f64 = 5.0;

/// Score when the portfolio holds no records
pub const EMPTY_PORTFOLIO_SCORE: f64 = 6.0;

pub const MIN_HEALTH_SCORE: f64 = 1.0;
pub const MAX_HEALTH_SCORE: f64 = 10.0;

/// Higher is healthier
pub const GRADE_WEIGHTS: [(&str, f64); 7] = [
    ("A", 10.0),
    ("B", 8.0),
    ("C", 6.0),
    ("D", 4.0),
    ("E", 2.0),
    ("F", 1.0),
    ("G", 0.5),
];

pub fn grade_weight(grade: &str) -> f64 {
    GRADE_WEIGHTS
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, w)| *w)
        .unwrap_or(UNKNOWN_GRADE_WEIGHT)
}

/// Σ(count × weight) / Σ count over `(grade, count)` pairs, clamped to [1, 10]
pub fn health_score<'a, I>(grade_counts: I) -> f64
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let (weighted, total) = grade_counts
        .into_iter()
        .fold((0.0, 0u64), |(w, n), (grade, count)| {
            (w + count as f64 * grade_weight(grade), n + count)
        });

    if total == 0 {
        return EMPTY_PORTFOLIO_SCORE;
    }
    (weighted / total as f64).clamp(MIN_HEALTH_SCORE, MAX_HEALTH_SCORE)
}
