//! Model Artifact - On-disk Classifier Format
//!
//! A model ships as an ONNX graph plus a `ModelManifest` sidecar (feature
//! names, categorical encoding tables, optional importances), or as a single
//! JSON document embedding the manifest and in-crate classifier parameters.
//! The raw model bytes are hashed with SHA-256 on load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::classifier::{GradientBoostedClassifier, LogisticClassifier, Objective, RiskClassifier, Tree};
use crate::logic::features::layout::{self, LayoutMismatchError, FEATURE_COUNT};
use crate::logic::features::{CategoryEncodings, FeatureEncoder};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("{0}")]
    Layout(#[from] LayoutMismatchError),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("ONNX runtime error: {0}")]
    Runtime(String),
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    GradientBoosted {
        #[serde(default)]
        base_score: f64,
        objective: Objective,
        trees: Vec<Tree>,
    },
}

/// Everything about a model except its parameters. Embedded in JSON
/// artifacts; a sidecar file next to ONNX graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    /// Must equal the feature layout, in order
    pub feature_names: Vec<String>,
    /// CRC32 of the layout at training time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
    #[serde(default)]
    pub encodings: CategoryEncodings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f32>>,
}

impl ModelManifest {
    /// Manifest for a graph shipped without a sidecar
    pub fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            feature_names: layout::FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            layout_hash: None,
            encodings: CategoryEncodings::new(),
            feature_importances: None,
        }
    }

    /// Layout checks; importance problems only warn
    pub fn validate(&self) -> Result<(), ModelError> {
        layout::validate_names(self.feature_names.as_slice())?;
        if let Some(hash) = self.layout_hash {
            layout::validate_hash(hash)?;
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != FEATURE_COUNT {
                log::warn!(
                    "Model '{}' has {} importances for {} features; explanations will be truncated",
                    self.name,
                    importances.len(),
                    FEATURE_COUNT
                );
            }
        }
        Ok(())
    }

    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new(self.encodings.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(flatten)]
    pub manifest: ModelManifest,
    pub classifier: ClassifierSpec,
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self.classifier {
            ClassifierSpec::Logistic { .. } => "logistic",
            ClassifierSpec::GradientBoosted { .. } => "gradient_boosted",
        }
    }

    /// Manifest and parameter checks
    pub fn validate(&self) -> Result<(), ModelError> {
        self.manifest.validate()?;

        match &self.classifier {
            ClassifierSpec::Logistic { intercept, coefficients } => {
                if coefficients.len() != FEATURE_COUNT {
                    return Err(ModelError::Invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        FEATURE_COUNT
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::Invalid("non-finite coefficient".to_string()));
                }
            }
            ClassifierSpec::GradientBoosted { trees, .. } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("ensemble has no trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(FEATURE_COUNT)
                        .map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
                }
            }
        }
        Ok(())
    }

    /// Classifier + encoder described by this artifact
    pub fn build(self) -> (Box<dyn RiskClassifier>, FeatureEncoder) {
        let importances = self.manifest.feature_importances;
        let classifier: Box<dyn RiskClassifier> = match self.classifier {
            ClassifierSpec::Logistic { intercept, coefficients } => {
                Box::new(LogisticClassifier::new(intercept, coefficients, importances))
            }
            ClassifierSpec::GradientBoosted { base_score, objective, trees } => Box::new(
                GradientBoostedClassifier::new(base_score, objective, trees, FEATURE_COUNT, importances),
            ),
        };
        (classifier, FeatureEncoder::new(self.manifest.encodings))
    }
}

// ============================================================================
// LOADING
// ============================================================================

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read a model file and check it against a pinned SHA-256.
/// Returns the bytes and their digest.
pub fn read_verified(path: &Path, expected_sha256: Option<&str>) -> Result<(Vec<u8>, String), ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = sha256_hex(&bytes);

    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(ModelError::ChecksumMismatch {
                expected: expected.to_string(),
                actual: digest,
            });
        }
    }
    Ok((bytes, digest))
}

/// Read, verify and parse a JSON artifact. Returns the artifact and its SHA-256.
pub fn read_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<(ModelArtifact, String), ModelError> {
    let (bytes, digest) = read_verified(path, expected_sha256)?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
    artifact.validate()?;
    Ok((artifact, digest))
}

/// Sidecar manifest of an ONNX graph: `credit_model.onnx` → `credit_model.meta.json`
pub fn manifest_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("meta.json")
}

/// Sidecar manifest, or a bare one (legacy encodings, no importances) when absent
pub fn read_manifest(model_path: &Path) -> Result<ModelManifest, ModelError> {
    let path = manifest_path(model_path);
    if !path.exists() {
        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        log::warn!(
            "No manifest at {}; using legacy encodings and no feature importances",
            path.display()
        );
        return Ok(ModelManifest::bare(&name));
    }

    let raw = std::fs::read(&path).map_err(|source| ModelError::Io {
        path: path.clone(),
        source,
    })?;
    let manifest: ModelManifest = serde_json::from_slice(&raw)?;
    manifest.validate()?;
    Ok(manifest)
}
