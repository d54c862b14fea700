//! Aggregation Engine
//!
//! Issues grouped-aggregate reads against the loan table and assembles the
//! typed analytics views. Every figure is exact over the table at call time:
//! no sampling, no caching. Any failed read aborts the whole view.

use std::sync::Arc;

use super::buckets::CreditBucket;
use super::segments::SegmentKey;
use super::types::*;
use crate::error::RiskResult;
use crate::logic::store::{
    AggregateRow, Column, Filter, GroupKey, GroupedQuery, Measure, OrderBy, SortDirection,
    TabularStore,
};

/// Max purposes returned in the loan analytics view
pub const PURPOSE_ANALYSIS_TOP_N: usize = 10;

/// `defaults / total * 100`, 0 for an empty portfolio
pub fn default_rate(defaults: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        defaults as f64 * 100.0 / total as f64
    }
}

#[derive(Clone)]
pub struct AggregationEngine {
    store: Arc<dyn TabularStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TabularStore> {
        &self.store
    }

    /// Single-row aggregate (no grouping)
    fn totals(&self, query: &GroupedQuery) -> RiskResult<AggregateRow> {
        let rows = self.store.aggregate(query)?;
        Ok(rows.into_iter().next().unwrap_or(AggregateRow {
            key: None,
            values: vec![None; query.measures.len()],
        }))
    }

    // ========================================================================
    // KPI SUMMARY
    // ========================================================================

    pub fn kpi_summary(&self) -> RiskResult<KpiSummary> {
        self.store.ensure_ready()?;

        let totals = self.totals(
            &GroupedQuery::new()
                .measure(Measure::Count)
                .measure(Measure::Sum(Column::LoanAmnt))
                .measure(Measure::Avg(Column::LoanAmnt))
                .measure(Measure::Avg(Column::InitialFicoScore)),
        )?;
        let defaults = self.totals(
            &GroupedQuery::new()
                .measure(Measure::Count)
                .filter(Filter::Eq(Column::IsDefaulted, 1)),
        )?;

        let total = totals.count(0);
        let total_defaults = defaults.count(0);
        let rate = default_rate(total_defaults, total);

        let distributions = KpiDistributions {
            grade: self.segment_counts(SegmentKey::Grade)?,
            purpose: self.segment_counts(SegmentKey::Purpose)?,
            home_ownership: self.segment_counts(SegmentKey::HomeOwnership)?,
        };

        log::debug!("KPI summary: {} loans, {} defaults", total, total_defaults);

        Ok(KpiSummary {
            overview: KpiOverview {
                total_beneficiaries: total,
                total_loan_amount: totals.value(1),
                avg_loan_amount: totals.value(2),
                avg_credit_score: totals.value(3),
                default_rate_percent: rate,
            },
            distributions,
            risk_metrics: RiskMetrics {
                total_defaults,
                default_rate: rate,
            },
        })
    }

    /// `(value, count)` pairs for one segment key
    pub fn distribution(&self, key: SegmentKey) -> RiskResult<Vec<SegmentCount>> {
        self.store.ensure_ready()?;
        self.segment_counts(key)
    }

    fn segment_counts(&self, key: SegmentKey) -> RiskResult<Vec<SegmentCount>> {
        let rows = self.store.aggregate(&key.distribution_query())?;
        Ok(rows
            .iter()
            .map(|row| SegmentCount {
                segment: row.key_or_null(),
                count: row.count(0),
            })
            .collect())
    }

    // ========================================================================
    // PORTFOLIO BASE
    // ========================================================================

    pub fn portfolio_base(&self) -> RiskResult<PortfolioBase> {
        self.store.ensure_ready()?;

        let row = self.totals(
            &GroupedQuery::new()
                .measure(Measure::Avg(Column::InitialFicoScore))
                .measure(Measure::DefaultRate)
                .measure(Measure::Count)
                .measure(Measure::Avg(Column::LoanAmnt)),
        )?;

        Ok(PortfolioBase {
            avg_credit_score: row.value(0),
            default_rate: row.value(1),
            total_loans: row.count(2),
            avg_loan_amount: row.value(3),
        })
    }

    /// Record count per grade, ordered by grade
    pub fn grade_counts(&self) -> RiskResult<Vec<SegmentCount>> {
        self.segment_counts(SegmentKey::Grade)
    }

    // ========================================================================
    // LOAN ANALYTICS
    // ========================================================================

    pub fn loan_analytics(&self) -> RiskResult<LoanAnalytics> {
        self.store.ensure_ready()?;

        let by_grade = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(GroupKey::Column(Column::Grade))
                .measure(Measure::Count)
                .measure(Measure::Avg(Column::LoanAmnt))
                .measure(Measure::Sum(Column::LoanAmnt))
                .measure(Measure::Min(Column::LoanAmnt))
                .measure(Measure::Max(Column::LoanAmnt))
                .order_by(OrderBy::Key(SortDirection::Asc)),
        )?;

        let by_purpose = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(GroupKey::Column(Column::Purpose))
                .measure(Measure::Count)
                .measure(Measure::Avg(Column::LoanAmnt))
                .measure(Measure::Avg(Column::InitialFicoScore))
                .measure(Measure::DefaultRate)
                .order_by(OrderBy::Measure(0, SortDirection::Desc))
                .order_by(OrderBy::Key(SortDirection::Asc))
                .limit(PURPOSE_ANALYSIS_TOP_N),
        )?;

        let by_term = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(GroupKey::Column(Column::Term))
                .measure(Measure::Count)
                .measure(Measure::Avg(Column::LoanAmnt))
                .measure(Measure::Avg(Column::IntRate))
                .order_by(OrderBy::Key(SortDirection::Asc)),
        )?;

        Ok(LoanAnalytics {
            loan_by_grade: by_grade
                .iter()
                .map(|r| GradeLoanStats {
                    grade: r.key_or_null(),
                    loan_count: r.count(0),
                    avg_amount: r.value(1),
                    total_amount: r.value(2),
                    min_amount: r.value(3),
                    max_amount: r.value(4),
                })
                .collect(),
            purpose_analysis: by_purpose
                .iter()
                .map(|r| PurposeStats {
                    purpose: r.key_or_null(),
                    loan_count: r.count(0),
                    avg_amount: r.value(1),
                    avg_credit: r.value(2),
                    default_rate: r.value(3),
                })
                .collect(),
            term_analysis: by_term
                .iter()
                .map(|r| TermStats {
                    term: r.key_or_null(),
                    loan_count: r.count(0),
                    avg_amount: r.value(1),
                    avg_interest_rate: r.value(2),
                })
                .collect(),
        })
    }

    // ========================================================================
    // RISK ANALYTICS
    // ========================================================================

    pub fn risk_analytics(&self) -> RiskResult<RiskAnalytics> {
        self.store.ensure_ready()?;

        let by_grade = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(GroupKey::Column(Column::Grade))
                .measure(Measure::Count)
                .measure(Measure::Defaults)
                .measure(Measure::DefaultRate)
                .measure(Measure::Avg(Column::InitialFicoScore))
                .order_by(OrderBy::Key(SortDirection::Asc)),
        )?;

        let by_home = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(GroupKey::Column(Column::HomeOwnership))
                .measure(Measure::Count)
                .measure(Measure::DefaultRate)
                .measure(Measure::Avg(Column::LoanAmnt))
                .measure(Measure::Avg(Column::AnnualInc))
                .order_by(OrderBy::Measure(1, SortDirection::Desc))
                .order_by(OrderBy::Key(SortDirection::Asc)),
        )?;

        Ok(RiskAnalytics {
            default_by_grade: by_grade
                .iter()
                .map(|r| GradeRiskStats {
                    grade: r.key_or_null(),
                    total_loans: r.count(0),
                    defaults: r.count(1),
                    default_rate: r.value(2),
                    avg_credit: r.value(3),
                })
                .collect(),
            credit_risk_analysis: self.credit_buckets()?,
            home_ownership_risk: by_home
                .iter()
                .map(|r| HomeOwnershipRiskStats {
                    home_ownership: r.key_or_null(),
                    total_loans: r.count(0),
                    default_rate: r.value(1),
                    avg_loan_amount: r.value(2),
                    avg_income: r.value(3),
                })
                .collect(),
        })
    }

    /// Default rate and average loan per FICO bucket, ordered by lower bound.
    /// Buckets with no loans are omitted.
    pub fn credit_buckets(&self) -> RiskResult<Vec<CreditBucketStats>> {
        let rows = self.store.aggregate(
            &GroupedQuery::new()
                .group_by(CreditBucket::group_key())
                .measure(Measure::Count)
                .measure(Measure::DefaultRate)
                .measure(Measure::Avg(Column::LoanAmnt))
                .order_by(OrderBy::MinOf(Column::InitialFicoScore, SortDirection::Asc)),
        )?;

        let mut stats: Vec<CreditBucketStats> = rows
            .iter()
            .filter_map(|r| {
                let label = r.key.as_ref().and_then(|k| k.as_text())?;
                let bucket = CreditBucket::from_label(label)?;
                Some(CreditBucketStats {
                    credit_range: label.to_string(),
                    bucket,
                    loan_count: r.count(0),
                    default_rate: r.value(1),
                    avg_loan_amount: r.value(2),
                })
            })
            .collect();

        // Unscored rows group under a NULL key and are dropped above
        stats.sort_by_key(|s| s.bucket);
        Ok(stats)
    }
}
