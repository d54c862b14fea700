use std::sync::Arc;

use super::*;
use crate::error::RiskError;
use crate::logic::store::fixtures::{empty_connection, insert, loan, sample_portfolio, store_with, TABLE};
use crate::logic::store::SqliteStore;
use crate::logic::store::SegmentValue;

fn engine() -> AggregationEngine {
    AggregationEngine::new(Arc::new(store_with(&sample_portfolio())))
}

fn text(s: &str) -> SegmentValue {
    SegmentValue::Text(s.to_string())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_default_rate() {
    assert_eq!(default_rate(3, 10), 30.0);
    assert_eq!(default_rate(0, 10), 0.0);
    assert_eq!(default_rate(0, 0), 0.0);
}

#[test]
fn test_kpi_summary_overview() {
    let kpi = engine().kpi_summary().unwrap();

    assert_eq!(kpi.overview.total_beneficiaries, 10);
    assert_eq!(kpi.overview.total_loan_amount, 105_000.0);
    assert!(close(kpi.overview.avg_loan_amount, 10_500.0));
    assert!(close(kpi.overview.avg_credit_score, 685.0));
    assert_eq!(kpi.overview.default_rate_percent, 30.0);
    assert_eq!(kpi.risk_metrics.total_defaults, 3);
    assert_eq!(kpi.risk_metrics.default_rate, 30.0);
}

#[test]
fn test_kpi_distributions() {
    let kpi = engine().kpi_summary().unwrap();

    let grades: Vec<_> = kpi.distributions.grade.iter().map(|s| s.segment.clone()).collect();
    assert_eq!(grades.first(), Some(&text("A")));
    assert_eq!(grades.last(), Some(&text("G")));
    assert_eq!(kpi.distributions.grade.iter().map(|s| s.count).sum::<u64>(), 10);

    // Top 5 purposes, ties broken alphabetically
    let purposes: Vec<_> = kpi
        .distributions
        .purpose
        .iter()
        .map(|s| (s.segment.to_string(), s.count))
        .collect();
    assert_eq!(
        purposes,
        vec![
            ("debt_consolidation".to_string(), 3),
            ("credit_card".to_string(), 2),
            ("car".to_string(), 1),
            ("home_improvement".to_string(), 1),
            ("medical".to_string(), 1),
        ]
    );

    let home = &kpi.distributions.home_ownership;
    assert_eq!(home[0].segment, text("RENT"));
    assert_eq!(home[0].count, 6);
    assert_eq!(home.len(), 3);
}

#[test]
fn test_empty_table_is_data_unavailable() {
    let engine = AggregationEngine::new(Arc::new(store_with(&[])));
    assert!(matches!(engine.kpi_summary(), Err(RiskError::DataUnavailable(_))));
    assert!(matches!(engine.loan_analytics(), Err(RiskError::DataUnavailable(_))));
    assert!(matches!(engine.risk_analytics(), Err(RiskError::DataUnavailable(_))));
    assert!(matches!(engine.portfolio_base(), Err(RiskError::DataUnavailable(_))));
}

#[test]
fn test_empty_table_distribution_is_data_unavailable() {
    let engine = AggregationEngine::new(Arc::new(store_with(&[])));
    for key in SegmentKey::ALL {
        assert!(matches!(engine.distribution(key), Err(RiskError::DataUnavailable(_))));
    }
}

#[test]
fn test_portfolio_base() {
    let base = engine().portfolio_base().unwrap();
    assert_eq!(base.total_loans, 10);
    assert!(close(base.avg_credit_score, 685.0));
    assert!(close(base.default_rate, 30.0));
    assert!(close(base.avg_loan_amount, 10_500.0));
}

#[test]
fn test_loan_analytics() {
    let analytics = engine().loan_analytics().unwrap();

    let a = &analytics.loan_by_grade[0];
    assert_eq!(a.grade, text("A"));
    assert_eq!(a.loan_count, 2);
    assert_eq!(a.total_amount, 22_000.0);
    assert_eq!(a.min_amount, 10_000.0);
    assert_eq!(a.max_amount, 12_000.0);
    assert!(close(a.avg_amount, 11_000.0));

    assert_eq!(analytics.purpose_analysis.len(), 7);
    assert_eq!(analytics.purpose_analysis[0].purpose, text("debt_consolidation"));
    let small_business = analytics
        .purpose_analysis
        .iter()
        .find(|p| p.purpose == text("small_business"))
        .unwrap();
    assert!(close(small_business.default_rate, 100.0));

    let terms: Vec<_> = analytics.term_analysis.iter().map(|t| t.term.clone()).collect();
    assert_eq!(terms, vec![SegmentValue::Integer(36), SegmentValue::Integer(60)]);
    let long = &analytics.term_analysis[1];
    assert_eq!(long.loan_count, 2);
    assert!(close(long.avg_amount, 20_000.0));
    assert!(close(long.avg_interest_rate, 16.0));
}

#[test]
fn test_risk_analytics_by_grade() {
    let risk = engine().risk_analytics().unwrap();

    let c = risk
        .default_by_grade
        .iter()
        .find(|g| g.grade == text("C"))
        .unwrap();
    assert_eq!(c.total_loans, 2);
    assert_eq!(c.defaults, 1);
    assert!(close(c.default_rate, 50.0));

    let total_defaults: u64 = risk.default_by_grade.iter().map(|g| g.defaults).sum();
    assert_eq!(total_defaults, 3);
}

#[test]
fn test_credit_buckets_ordered_and_exhaustive() {
    let risk = engine().risk_analytics().unwrap();
    let buckets = &risk.credit_risk_analysis;

    let order: Vec<_> = buckets.iter().map(|b| b.bucket).collect();
    assert_eq!(order, CreditBucket::ALL.to_vec());
    assert_eq!(buckets.iter().map(|b| b.loan_count).sum::<u64>(), 10);

    let counts: Vec<_> = buckets.iter().map(|b| b.loan_count).collect();
    assert_eq!(counts, vec![2, 2, 3, 1, 2]);
    assert!(close(buckets[0].default_rate, 50.0));
    assert!(close(buckets[1].default_rate, 100.0));
    assert_eq!(buckets[4].credit_range, "Excellent (800+)");
}

#[test]
fn test_home_ownership_risk_sorted_by_default_rate() {
    let risk = engine().risk_analytics().unwrap();
    let home = &risk.home_ownership_risk;

    assert_eq!(home[0].home_ownership, text("RENT"));
    assert!(close(home[0].default_rate, 50.0));
    for pair in home.windows(2) {
        assert!(pair[0].default_rate >= pair[1].default_rate);
    }
}

#[test]
fn test_distribution_by_term() {
    let dist = engine().distribution(SegmentKey::Term).unwrap();
    assert_eq!(dist.len(), 2);
    assert_eq!(dist[0].count, 8);
    assert_eq!(dist[1].count, 2);
}

#[test]
fn test_credit_bucket_boundaries() {
    let scores = [579, 580, 669, 670, 739, 740, 799, 800];
    let records: Vec<_> = scores
        .iter()
        .enumerate()
        .map(|(i, &fico)| loan(i as i64 + 1, "B", 1_000.0, fico, false))
        .collect();
    let engine = AggregationEngine::new(Arc::new(store_with(&records)));

    let buckets = engine.credit_buckets().unwrap();
    let counts: Vec<_> = buckets
        .iter()
        .map(|b| (b.credit_range.as_str(), b.loan_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("Poor (< 580)", 1),
            ("Fair (580-669)", 2),
            ("Good (670-739)", 2),
            ("Very Good (740-799)", 2),
            ("Excellent (800+)", 1),
        ]
    );
}

#[test]
fn test_unscored_loans_fall_in_no_bucket() {
    let conn = empty_connection();
    insert(&conn, &[loan(1, "A", 1_000.0, 810, false), loan(2, "C", 1_000.0, 600, true)]);
    conn.execute(
        "INSERT INTO beneficiaries (id, loan_amnt, grade, is_defaulted) VALUES (3, 500.0, 'D', 1)",
        [],
    )
    .unwrap();
    let store = SqliteStore::from_connection(conn, TABLE).unwrap();
    let engine = AggregationEngine::new(Arc::new(store));

    let buckets = engine.credit_buckets().unwrap();
    let counts: Vec<_> = buckets.iter().map(|b| (b.bucket, b.loan_count)).collect();
    assert_eq!(
        counts,
        vec![(CreditBucket::Fair, 1), (CreditBucket::Excellent, 1)]
    );
}
