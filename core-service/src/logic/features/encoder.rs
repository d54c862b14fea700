//! Feature Encoder
//!
//! Turns an `ApplicationInput` into a `FeatureVector`. Numeric fields pass
//! through; categorical fields are mapped with the encoding tables persisted
//! next to the model. A field without a table falls back to per-request
//! encoding, which always yields code 0 for a single application.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::application::{ApplicationInput, FieldValue};
use super::layout::{CATEGORICAL_FEATURES, FEATURE_LAYOUT};
use super::vector::FeatureVector;
use crate::error::{RiskError, RiskResult};

/// Code a lone value receives under per-request encoding
pub const LEGACY_CODE: u32 = 0;

static SUB_GRADE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][1-5]$").expect("sub_grade pattern is valid"));

// ============================================================================
// ENCODING TABLES
// ============================================================================

/// Value → code for one categorical field
pub type CategoryMap = BTreeMap<String, u32>;

/// Encoding tables keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryEncodings(BTreeMap<String, CategoryMap>);

impl CategoryEncodings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes assigned in sorted value order, starting at 0
    pub fn with_values(mut self, field: &str, values: &[&str]) -> Self {
        let mut sorted: Vec<&str> = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let map = sorted
            .into_iter()
            .enumerate()
            .map(|(code, v)| (v.to_string(), code as u32))
            .collect();
        self.0.insert(field.to_string(), map);
        self
    }

    pub fn get(&self, field: &str) -> Option<&CategoryMap> {
        self.0.get(field)
    }

    /// Categorical fields without a persisted table
    pub fn missing_fields(&self) -> Vec<&'static str> {
        CATEGORICAL_FEATURES
            .iter()
            .copied()
            .filter(|f| !self.0.contains_key(*f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// ENCODER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    encodings: CategoryEncodings,
}

impl FeatureEncoder {
    pub fn new(encodings: CategoryEncodings) -> Self {
        let missing = encodings.missing_fields();
        if !missing.is_empty() {
            log::warn!(
                "No persisted encoding for {:?}; these fields use per-request codes that may not match training",
                missing
            );
        }
        Self { encodings }
    }

    pub fn encodings(&self) -> &CategoryEncodings {
        &self.encodings
    }

    /// Encode every field in layout order. Fails on the first bad field.
    pub fn encode(&self, input: &ApplicationInput) -> RiskResult<FeatureVector> {
        let mut vector = FeatureVector::new();

        for (index, name) in FEATURE_LAYOUT.iter().enumerate() {
            let value = input.field(name).ok_or_else(|| RiskError::EncodingFailure {
                field: name.to_string(),
                value: String::new(),
                reason: "field missing from application".to_string(),
            })?;

            let encoded = match value {
                FieldValue::Text(raw) => self.encode_category(name, raw)? as f32,
                FieldValue::Integer(i) => i as f32,
                FieldValue::Real(r) if r.is_finite() => r as f32,
                FieldValue::Real(r) => {
                    return Err(RiskError::EncodingFailure {
                        field: name.to_string(),
                        value: r.to_string(),
                        reason: "not a finite number".to_string(),
                    })
                }
            };
            vector.set(index, encoded);
        }

        Ok(vector)
    }

    fn encode_category(&self, field: &str, raw: &str) -> RiskResult<u32> {
        let fail = |reason: &str| RiskError::EncodingFailure {
            field: field.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let value = raw.trim();
        if value.is_empty() {
            return Err(fail("empty value"));
        }
        if field == "sub_grade" && !SUB_GRADE_RE.is_match(value) {
            return Err(fail("expected a grade letter followed by 1-5"));
        }

        match self.encodings.get(field) {
            Some(map) => map
                .get(value)
                .copied()
                .ok_or_else(|| fail("value not seen in training")),
            None => {
                log::debug!("Per-request encoding for '{}'", field);
                Ok(LEGACY_CODE)
            }
        }
    }
}
