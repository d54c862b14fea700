//! Model Module - Credit Risk Classifier
//!
//! The classifier is opaque to the rest of the engine: it takes encoded
//! feature rows and returns default probabilities (or a scalar score).
//!
//! ## Structure
//! - `classifier`: `RiskClassifier` trait + logistic / tree-ensemble models
//! - `onnx`: ONNX Runtime classifier for exported models
//! - `artifact`: manifests, JSON artifacts, checksum and layout checks
//! - `registry`: `ModelService`, the lazily loaded handle

pub mod artifact;
pub mod classifier;
pub mod onnx;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

pub use artifact::{ClassifierSpec, ModelArtifact, ModelError, ModelManifest};
pub use classifier::{
    ClassifierError, GradientBoostedClassifier, LogisticClassifier, Objective, RiskClassifier,
};
pub use onnx::OnnxClassifier;
pub use registry::{LoadedModel, ModelMetadata, ModelService, ModelStatus};
