//! Error handling

use thiserror::Error;

use crate::logic::model::{ClassifierError, ModelError};
use crate::logic::store::StoreError;

pub type RiskResult<T> = Result<T, RiskError>;

/// Operator hint attached to every `ModelUnavailable`
pub const MODEL_REMEDIATION_HINT: &str =
    "Scoring is disabled. Check MODEL_PATH points at a valid model artifact and restart.";

#[derive(Debug, Error)]
pub enum RiskError {
    /// Loan table missing, empty or unreachable
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Unknown grouping or sort key
    #[error("Invalid segment key: '{0}'")]
    InvalidSegment(String),

    /// No classifier artifact could be loaded
    #[error("AI model not available: {reason}. {hint}")]
    ModelUnavailable { reason: String, hint: &'static str },

    /// Categorical value the encoder cannot map
    #[error("Cannot encode field '{field}' (value '{value}'): {reason}")]
    EncodingFailure {
        field: String,
        value: String,
        reason: String,
    },

    /// Classifier invocation raised
    #[error("Prediction error: {0}")]
    PredictionFailed(#[source] ClassifierError),
}

impl RiskError {
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        RiskError::ModelUnavailable {
            reason: reason.into(),
            hint: MODEL_REMEDIATION_HINT,
        }
    }

    /// Short machine-readable kind, used by the CLI exit output
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::DataUnavailable(_) => "data_unavailable",
            RiskError::InvalidSegment(_) => "invalid_segment",
            RiskError::ModelUnavailable { .. } => "model_unavailable",
            RiskError::EncodingFailure { .. } => "encoding_failure",
            RiskError::PredictionFailed(_) => "prediction_failed",
        }
    }
}

impl From<StoreError> for RiskError {
    fn from(err: StoreError) -> Self {
        RiskError::DataUnavailable(err.to_string())
    }
}

impl From<ModelError> for RiskError {
    fn from(err: ModelError) -> Self {
        RiskError::model_unavailable(err.to_string())
    }
}

impl From<ClassifierError> for RiskError {
    fn from(err: ClassifierError) -> Self {
        RiskError::PredictionFailed(err)
    }
}
