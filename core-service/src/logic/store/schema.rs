//! Loan Table Schema
//!
//! Whitelisted column identifiers and the typed loan row.
//! Query rendering only ever emits names from `Column::as_str()`.

use serde::{Deserialize, Serialize};

/// Columns of the loan table the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    LoanAmnt,
    Term,
    IntRate,
    Installment,
    Grade,
    SubGrade,
    EmpLength,
    HomeOwnership,
    AnnualInc,
    VerificationStatus,
    Purpose,
    Dti,
    InitialFicoScore,
    IsDefaulted,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Id,
        Column::LoanAmnt,
        Column::Term,
        Column::IntRate,
        Column::Installment,
        Column::Grade,
        Column::SubGrade,
        Column::EmpLength,
        Column::HomeOwnership,
        Column::AnnualInc,
        Column::VerificationStatus,
        Column::Purpose,
        Column::Dti,
        Column::InitialFicoScore,
        Column::IsDefaulted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::LoanAmnt => "loan_amnt",
            Column::Term => "term",
            Column::IntRate => "int_rate",
            Column::Installment => "installment",
            Column::Grade => "grade",
            Column::SubGrade => "sub_grade",
            Column::EmpLength => "emp_length",
            Column::HomeOwnership => "home_ownership",
            Column::AnnualInc => "annual_inc",
            Column::VerificationStatus => "verification_status",
            Column::Purpose => "purpose",
            Column::Dti => "dti",
            Column::InitialFicoScore => "initial_fico_score",
            Column::IsDefaulted => "is_defaulted",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted loan row. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: i64,
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
    pub initial_fico_score: i64,
    pub is_defaulted: i64,
}

impl LoanRecord {
    pub fn defaulted(&self) -> bool {
        self.is_defaulted == 1
    }
}

/// Column description from the store's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}
