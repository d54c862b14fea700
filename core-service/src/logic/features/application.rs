//! Loan application submitted for scoring
//!
//! All 37 fields are required; serde rejects a payload missing any of them.

use serde::{Deserialize, Serialize};

use super::layout::FEATURE_LAYOUT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub loan_amnt: f64,
    pub term: i64,
    pub int_rate: f64,
    pub installment: f64,
    pub grade: String,
    pub sub_grade: String,
    pub emp_length: f64,
    pub home_ownership: String,
    pub annual_inc: f64,
    pub verification_status: String,
    pub purpose: String,
    pub dti: f64,
    pub delinq_2yrs: i64,
    pub inq_last_6mths: i64,
    pub open_acc: i64,
    pub pub_rec: i64,
    pub revol_bal: f64,
    pub revol_util: f64,
    pub total_acc: i64,
    pub application_type: String,
    pub initial_fico_score: i64,
    pub credit_history_length_years: f64,
    pub is_first_time_borrower_flag: i64,
    pub month_of_loan: i64,
    pub principal_remaining: f64,
    pub interest_paid_this_month: f64,
    pub financial_state: String,
    pub synthetic_electricity_units: i64,
    pub synthetic_mobile_recharge_amt: i64,
    pub synthetic_utility_payment_ontime: i64,
    pub synthetic_payment_status: i64,
    pub consumption_stability_last_6m: f64,
    pub missed_payments_last_3m: i64,
    pub avg_recharge_amt_last_3m: i64,
    pub consumption_trend_last_6m: f64,
    pub time_in_stress_or_crisis: i64,
    pub months_in_stress_or_crisis_l6m: i64,
}

/// Raw value of one application field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Real(f64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Numeric value, `None` for text
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Real(r) => Some(*r),
            FieldValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            // Whole reals keep their decimal point: 10000.0, not 10000
            FieldValue::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{:.1}", r),
            FieldValue::Real(r) => write!(f, "{}", r),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl ApplicationInput {
    /// Field by layout name
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        use FieldValue::*;

        let value = match name {
            "loan_amnt" => Real(self.loan_amnt),
            "term" => Integer(self.term),
            "int_rate" => Real(self.int_rate),
            "installment" => Real(self.installment),
            "grade" => Text(&self.grade),
            "sub_grade" => Text(&self.sub_grade),
            "emp_length" => Real(self.emp_length),
            "home_ownership" => Text(&self.home_ownership),
            "annual_inc" => Real(self.annual_inc),
            "verification_status" => Text(&self.verification_status),
            "purpose" => Text(&self.purpose),
            "dti" => Real(self.dti),
            "delinq_2yrs" => Integer(self.delinq_2yrs),
            "inq_last_6mths" => Integer(self.inq_last_6mths),
            "open_acc" => Integer(self.open_acc),
            "pub_rec" => Integer(self.pub_rec),
            "revol_bal" => Real(self.revol_bal),
            "revol_util" => Real(self.revol_util),
            "total_acc" => Integer(self.total_acc),
            "application_type" => Text(&self.application_type),
            "initial_fico_score" => Integer(self.initial_fico_score),
            "credit_history_length_years" => Real(self.credit_history_length_years),
            "is_first_time_borrower_flag" => Integer(self.is_first_time_borrower_flag),
            "month_of_loan" => Integer(self.month_of_loan),
            "principal_remaining" => Real(self.principal_remaining),
            "interest_paid_this_month" => Real(self.interest_paid_this_month),
            "financial_state" => Text(&self.financial_state),
            "synthetic_electricity_units" => Integer(self.synthetic_electricity_units),
            "synthetic_mobile_recharge_amt" => Integer(self.synthetic_mobile_recharge_amt),
            "synthetic_utility_payment_ontime" => Integer(self.synthetic_utility_payment_ontime),
            "synthetic_payment_status" => Integer(self.synthetic_payment_status),
            "consumption_stability_last_6m" => Real(self.consumption_stability_last_6m),
            "missed_payments_last_3m" => Integer(self.missed_payments_last_3m),
            "avg_recharge_amt_last_3m" => Integer(self.avg_recharge_amt_last_3m),
            "consumption_trend_last_6m" => Real(self.consumption_trend_last_6m),
            "time_in_stress_or_crisis" => Integer(self.time_in_stress_or_crisis),
            "months_in_stress_or_crisis_l6m" => Integer(self.months_in_stress_or_crisis_l6m),
            _ => return None,
        };
        Some(value)
    }

    /// Every field in layout order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldValue<'_>)> + '_ {
        FEATURE_LAYOUT
            .iter()
            .filter_map(move |&name| self.field(name).map(|v| (name, v)))
    }

    /// Display string of a field, as reported in top factors
    pub fn display_value(&self, name: &str) -> Option<String> {
        self.field(name).map(|v| v.to_string())
    }
}

impl Default for ApplicationInput {
    /// Low-risk sample applicant
    fn default() -> Self {
        Self {
            loan_amnt: 10_000.0,
            term: 36,
            int_rate: 7.5,
            installment: 311.06,
            grade: "A".to_string(),
            sub_grade: "A3".to_string(),
            emp_length: 10.0,
            home_ownership: "MORTGAGE".to_string(),
            annual_inc: 85_000.0,
            verification_status: "Verified".to_string(),
            purpose: "debt_consolidation".to_string(),
            dti: 12.5,
            delinq_2yrs: 0,
            inq_last_6mths: 0,
            open_acc: 8,
            pub_rec: 0,
            revol_bal: 5_000.0,
            revol_util: 25.0,
            total_acc: 15,
            application_type: "Individual".to_string(),
            initial_fico_score: 780,
            credit_history_length_years: 15.0,
            is_first_time_borrower_flag: 0,
            month_of_loan: 1,
            principal_remaining: 10_000.0,
            interest_paid_this_month: 62.5,
            financial_state: "Stable".to_string(),
            synthetic_electricity_units: 300,
            synthetic_mobile_recharge_amt: 500,
            synthetic_utility_payment_ontime: 1,
            synthetic_payment_status: 1,
            consumption_stability_last_6m: 0.9,
            missed_payments_last_3m: 0,
            avg_recharge_amt_last_3m: 500,
            consumption_trend_last_6m: 0.05,
            time_in_stress_or_crisis: 0,
            months_in_stress_or_crisis_l6m: 0,
        }
    }
}
