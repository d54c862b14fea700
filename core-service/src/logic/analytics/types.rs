//! Analytics Types
//!
//! Typed records for every analytics view. No logic here.

use serde::{Deserialize, Serialize};

use super::buckets::CreditBucket;
use crate::logic::store::SegmentValue;

// ============================================================================
// KPI SUMMARY
// ============================================================================

/// `(value, count)` pair of a segment distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: SegmentValue,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiOverview {
    pub total_beneficiaries: u64,
    pub total_loan_amount: f64,
    pub avg_loan_amount: f64,
    pub avg_credit_score: f64,
    pub default_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDistributions {
    pub grade: Vec<SegmentCount>,
    /// Top 5 purposes by count
    pub purpose: Vec<SegmentCount>,
    pub home_ownership: Vec<SegmentCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub total_defaults: u64,
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub overview: KpiOverview,
    pub distributions: KpiDistributions,
    pub risk_metrics: RiskMetrics,
}

// ============================================================================
// LOAN ANALYTICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLoanStats {
    pub grade: SegmentValue,
    pub loan_count: u64,
    pub avg_amount: f64,
    pub total_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeStats {
    pub purpose: SegmentValue,
    pub loan_count: u64,
    pub avg_amount: f64,
    pub avg_credit: f64,
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    pub term: SegmentValue,
    pub loan_count: u64,
    pub avg_amount: f64,
    pub avg_interest_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAnalytics {
    pub loan_by_grade: Vec<GradeLoanStats>,
    /// Top 10 purposes by count
    pub purpose_analysis: Vec<PurposeStats>,
    pub term_analysis: Vec<TermStats>,
}

// ============================================================================
// RISK ANALYTICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRiskStats {
    pub grade: SegmentValue,
    pub total_loans: u64,
    pub defaults: u64,
    pub default_rate: f64,
    pub avg_credit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditBucketStats {
    pub credit_range: String,
    pub bucket: CreditBucket,
    pub loan_count: u64,
    pub default_rate: f64,
    pub avg_loan_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeOwnershipRiskStats {
    pub home_ownership: SegmentValue,
    pub total_loans: u64,
    pub default_rate: f64,
    pub avg_loan_amount: f64,
    pub avg_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalytics {
    pub default_by_grade: Vec<GradeRiskStats>,
    pub credit_risk_analysis: Vec<CreditBucketStats>,
    pub home_ownership_risk: Vec<HomeOwnershipRiskStats>,
}

// ============================================================================
// PORTFOLIO BASE (input to trend synthesis)
// ============================================================================

/// Whole-portfolio figures the trend is projected from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PortfolioBase {
    pub total_loans: u64,
    pub avg_credit_score: f64,
    /// Percent, 0-100
    pub default_rate: f64,
    pub avg_loan_amount: f64,
}
