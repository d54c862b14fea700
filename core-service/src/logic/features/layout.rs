//! Feature Layout - Application Feature Order
//!
//! **This file controls the model input schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Model artifacts record the layout hash they were trained against;
//! loading rejects an artifact whose hash differs.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Application fields in the exact order the classifier consumes them
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Loan terms (0-5) ===
    "loan_amnt",
    "term",
    "int_rate",
    "installment",
    "grade",
    "sub_grade",

    // === Borrower profile (6-11) ===
    "emp_length",
    "home_ownership",
    "annual_inc",
    "verification_status",
    "purpose",
    "dti",

    // === Credit bureau (12-22) ===
    "delinq_2yrs",
    "inq_last_6mths",
    "open_acc",
    "pub_rec",
    "revol_bal",
    "revol_util",
    "total_acc",
    "application_type",
    "initial_fico_score",
    "credit_history_length_years",
    "is_first_time_borrower_flag",

    // === Repayment state (23-26) ===
    "month_of_loan",
    "principal_remaining",
    "interest_paid_this_month",
    "financial_state",

    // === Alternative data (27-36) ===
    "synthetic_electricity_units",
    "synthetic_mobile_recharge_amt",
    "synthetic_utility_payment_ontime",
    "synthetic_payment_status",
    "consumption_stability_last_6m",
    "missed_payments_last_3m",
    "avg_recharge_amt_last_3m",
    "consumption_trend_last_6m",
    "time_in_stress_or_crisis",
    "months_in_stress_or_crisis_l6m",
];

/// Must match FEATURE_LAYOUT.len()
pub const FEATURE_COUNT: usize = 37;

/// Fields that carry text and must be mapped to integer codes
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "grade",
    "sub_grade",
    "home_ownership",
    "verification_status",
    "purpose",
    "application_type",
    "financial_state",
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version + ordered names
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, Error)]
pub enum LayoutMismatchError {
    #[error("Feature layout hash mismatch: expected {expected:08x}, got {actual:08x}")]
    Hash { expected: u32, actual: u32 },

    #[error("Feature names do not match layout at index {index}: expected '{expected}', got '{actual}'")]
    Name {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} features, got {actual}")]
    Count { expected: usize, actual: usize },
}

/// Validate a layout hash recorded by a model artifact
pub fn validate_hash(incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current = layout_hash();
    if incoming_hash != current {
        return Err(LayoutMismatchError::Hash {
            expected: current,
            actual: incoming_hash,
        });
    }
    Ok(())
}

/// Validate a feature-name list against the layout, in order
pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    if names.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError::Count {
            expected: FEATURE_COUNT,
            actual: names.len(),
        });
    }
    for (index, (expected, actual)) in FEATURE_LAYOUT.iter().zip(names).enumerate() {
        let actual = AsRef::<str>::as_ref(actual);
        if *expected != actual {
            return Err(LayoutMismatchError::Name {
                index,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 37);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_names_unique() {
        let mut names: Vec<_> = FEATURE_LAYOUT.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_categoricals_are_in_layout() {
        for name in CATEGORICAL_FEATURES {
            assert!(feature_index(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn test_layout_hash_stable_and_non_zero() {
        assert_eq!(layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
        assert!(validate_hash(layout_hash()).is_ok());
        assert!(validate_hash(layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_names(FEATURE_LAYOUT).is_ok());

        let short = &FEATURE_LAYOUT[..36];
        assert!(matches!(
            validate_names(short),
            Err(LayoutMismatchError::Count { actual: 36, .. })
        ));

        let mut swapped: Vec<&str> = FEATURE_LAYOUT.to_vec();
        swapped.swap(0, 1);
        assert!(matches!(
            validate_names(&swapped),
            Err(LayoutMismatchError::Name { index: 0, .. })
        ));
    }

    #[test]
    fn test_feature_lookup() {
        assert_eq!(feature_index("loan_amnt"), Some(0));
        assert_eq!(feature_index("initial_fico_score"), Some(20));
        assert_eq!(feature_index("months_in_stress_or_crisis_l6m"), Some(36));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
