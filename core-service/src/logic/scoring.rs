//! Scoring Pipeline
//!
//! encode → classify → decide → explain, synchronously, for one
//! application. Either a full `PredictionResult` comes back or an error;
//! never a partial result.

use std::sync::Arc;

use crate::error::{RiskError, RiskResult};
use crate::logic::decision::{DecisionEngine, PredictionResult};
use crate::logic::explain;
use crate::logic::features::ApplicationInput;
use crate::logic::model::{ClassifierError, LoadedModel, ModelService, RiskClassifier};

pub struct ScoringPipeline {
    models: Arc<ModelService>,
    decision: DecisionEngine,
}

impl ScoringPipeline {
    pub fn new(models: Arc<ModelService>, decision: DecisionEngine) -> Self {
        Self { models, decision }
    }

    pub fn models(&self) -> &Arc<ModelService> {
        &self.models
    }

    pub fn predict(&self, input: &ApplicationInput) -> RiskResult<PredictionResult> {
        let model = self.models.get()?;
        score_with(&model, &self.decision, input)
    }
}

/// Score `input` against an already loaded model
pub fn score_with(
    model: &LoadedModel,
    decision: &DecisionEngine,
    input: &ApplicationInput,
) -> RiskResult<PredictionResult> {
    let vector = model.encoder.encode(input)?;
    log::debug!("Encoded application: {}", vector.to_log_entry());

    let probability = default_probability(model.classifier.as_ref(), vector.to_row().view())?;
    let top_factors = explain::explain(model.classifier.feature_importances(), input);

    let result = decision.decide(probability, top_factors);
    log::info!(
        "Scored application: {:.2}% ({})",
        result.prediction_probability,
        result.assessment
    );
    Ok(result)
}

/// Positive-class probability when the classifier has one, otherwise the
/// scalar output read as a probability. Clamped to [0, 1].
pub fn default_probability(
    classifier: &dyn RiskClassifier,
    row: ndarray::ArrayView2<f32>,
) -> RiskResult<f64> {
    let raw = if classifier.supports_proba() {
        let proba = classifier.predict_proba(row)?;
        proba
            .get((0, 1))
            .copied()
            .ok_or_else(|| {
                ClassifierError::Evaluation(format!(
                    "expected a (1, 2) probability matrix, got {:?}",
                    proba.shape()
                ))
            })?
    } else {
        let out = classifier.predict(row)?;
        out.get(0)
            .copied()
            .ok_or_else(|| ClassifierError::Evaluation("empty prediction".to_string()))?
    };

    if !raw.is_finite() {
        return Err(RiskError::PredictionFailed(ClassifierError::NonFinite));
    }
    if !(0.0..=1.0).contains(&raw) {
        log::warn!("Classifier output {} outside [0, 1]; clamping", raw);
    }
    Ok(raw.clamp(0.0, 1.0))
}
