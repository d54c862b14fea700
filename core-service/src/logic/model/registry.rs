//! Model Service - Lazily Loaded Classifier Handle
//!
//! Owns the classifier artifact for the lifetime of the process. The first
//! caller loads it; concurrent callers wait on the same load. A failed load
//! leaves nothing cached, so the next call tries again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::artifact::{read_artifact, read_manifest, read_verified, ModelArtifact, ModelError, ModelManifest};
use super::classifier::RiskClassifier;
use super::onnx::OnnxClassifier;
use crate::config::Config;
use crate::logic::features::layout::{layout_hash, FEATURE_COUNT};
use crate::logic::features::FeatureEncoder;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub kind: String,
    pub path: String,
    /// Hex SHA-256 of the artifact bytes
    pub sha256: String,
    pub feature_count: usize,
    pub layout_hash: u32,
    pub supports_proba: bool,
    pub has_importances: bool,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Status for the status/health surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub model_path: String,
    pub metadata: Option<ModelMetadata>,
}

/// Classifier plus the encoder its artifact ships with
pub struct LoadedModel {
    pub classifier: Box<dyn RiskClassifier>,
    pub encoder: FeatureEncoder,
    pub metadata: ModelMetadata,
}

impl LoadedModel {
    pub fn from_artifact(artifact: ModelArtifact, path: &str, sha256: String) -> Self {
        let name = artifact.manifest.name.clone();
        let (classifier, encoder) = artifact.build();
        Self::from_parts(name, classifier, encoder, path, sha256)
    }

    /// ONNX graph plus its manifest
    pub fn from_onnx(
        bytes: &[u8],
        manifest: ModelManifest,
        path: &str,
        sha256: String,
    ) -> Result<Self, ModelError> {
        let encoder = manifest.encoder();
        let classifier = OnnxClassifier::from_bytes(bytes, FEATURE_COUNT, manifest.feature_importances)?;
        Ok(Self::from_parts(manifest.name, Box::new(classifier), encoder, path, sha256))
    }

    fn from_parts(
        name: String,
        classifier: Box<dyn RiskClassifier>,
        encoder: FeatureEncoder,
        path: &str,
        sha256: String,
    ) -> Self {
        let metadata = ModelMetadata {
            name,
            kind: classifier.kind().to_string(),
            path: path.to_string(),
            sha256,
            feature_count: classifier.n_features(),
            layout_hash: layout_hash(),
            supports_proba: classifier.supports_proba(),
            has_importances: classifier.feature_importances().is_some(),
            loaded_at: chrono::Utc::now(),
        };

        Self {
            classifier,
            encoder,
            metadata,
        }
    }

    /// In-memory model, for callers that build classifiers themselves
    pub fn new(name: &str, classifier: Box<dyn RiskClassifier>, encoder: FeatureEncoder) -> Self {
        Self::from_parts(name.to_string(), classifier, encoder, "<memory>", String::new())
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct ModelService {
    path: PathBuf,
    expected_sha256: Option<String>,
    model: OnceCell<Arc<LoadedModel>>,
}

impl ModelService {
    pub fn new(path: impl Into<PathBuf>, expected_sha256: Option<String>) -> Self {
        Self {
            path: path.into(),
            expected_sha256,
            model: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.model_path.clone(), config.model_sha256.clone())
    }

    /// Service that starts with `model` already loaded
    pub fn from_loaded(model: LoadedModel) -> Self {
        Self {
            path: PathBuf::from(&model.metadata.path),
            expected_sha256: None,
            model: OnceCell::with_value(Arc::new(model)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loaded model, loading it on first use
    pub fn get(&self) -> Result<Arc<LoadedModel>, ModelError> {
        self.model.get_or_try_init(|| self.load()).map(Arc::clone)
    }

    fn load(&self) -> Result<Arc<LoadedModel>, ModelError> {
        log::info!("Loading model artifact from: {}", self.path.display());

        let model = self.load_file().map_err(|e| {
            log::error!("Model load failed: {}", e);
            e
        })?;

        log::info!(
            "Model '{}' loaded ({}, sha256 {})",
            model.metadata.name,
            model.metadata.kind,
            model.metadata.sha256
        );
        Ok(Arc::new(model))
    }

    /// `.onnx` graphs go through ONNX Runtime; anything else is a JSON artifact
    fn load_file(&self) -> Result<LoadedModel, ModelError> {
        let display = self.path.display().to_string();
        if is_onnx(&self.path) {
            let (bytes, sha256) = read_verified(&self.path, self.expected_sha256.as_deref())?;
            let manifest = read_manifest(&self.path)?;
            LoadedModel::from_onnx(&bytes, manifest, &display, sha256)
        } else {
            let (artifact, sha256) = read_artifact(&self.path, self.expected_sha256.as_deref())?;
            Ok(LoadedModel::from_artifact(artifact, &display, sha256))
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Current state without triggering a load
    pub fn status(&self) -> ModelStatus {
        let metadata = self.model.get().map(|m| m.metadata.clone());
        ModelStatus {
            model_loaded: metadata.is_some(),
            model_path: self.path.display().to_string(),
            metadata,
        }
    }
}

pub fn is_onnx(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false)
}

impl std::fmt::Debug for ModelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelService")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures::{
        logistic_artifact, regression_artifact, write_artifact, write_manifest,
    };

    #[test]
    fn test_lazy_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &logistic_artifact(-1.0));
        let service = ModelService::new(&path, None);

        assert!(!service.is_loaded());
        assert!(!service.status().model_loaded);

        let model = service.get().unwrap();
        assert!(service.is_loaded());
        assert_eq!(model.metadata.name, "credit_logistic");
        assert_eq!(model.metadata.feature_count, 37);
        assert!(model.metadata.supports_proba);

        let status = service.status();
        assert!(status.model_loaded);
        assert_eq!(status.metadata.unwrap().sha256.len(), 64);
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &logistic_artifact(-1.0));
        let service = Arc::new(ModelService::new(&path, None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.get().unwrap())
            })
            .collect();
        let models: Vec<Arc<LoadedModel>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for model in &models[1..] {
            assert!(Arc::ptr_eq(&models[0], model));
        }
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credit_model.json");
        let service = ModelService::new(&path, None);

        assert!(matches!(service.get(), Err(ModelError::NotFound(_))));
        assert!(!service.is_loaded());

        // Operator drops the artifact in place; next call succeeds
        write_artifact(dir.path(), &regression_artifact(0.2));
        let model = service.get().unwrap();
        assert!(!model.metadata.supports_proba);
    }

    #[test]
    fn test_pinned_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &logistic_artifact(-1.0));
        let service = ModelService::new(&path, Some("deadbeef".to_string()));
        assert!(matches!(service.get(), Err(ModelError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_from_loaded() {
        let (classifier, encoder) = logistic_artifact(0.0).build();
        let service = ModelService::from_loaded(LoadedModel::new("inline", classifier, encoder));
        assert!(service.is_loaded());
        assert_eq!(service.get().unwrap().metadata.path, "<memory>");
    }

    #[test]
    fn test_is_onnx() {
        assert!(is_onnx(Path::new("models/credit_model.onnx")));
        assert!(is_onnx(Path::new("CREDIT.ONNX")));
        assert!(!is_onnx(Path::new("credit_model.json")));
        assert!(!is_onnx(Path::new("credit_model")));
    }

    #[test]
    fn test_onnx_path_uses_runtime_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credit_model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();
        let service = ModelService::new(&path, None);

        assert!(matches!(service.get(), Err(ModelError::Runtime(_))));
        assert!(!service.is_loaded());
    }

    #[test]
    fn test_onnx_checked_before_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credit_model.onnx");
        std::fs::write(&path, b"graph bytes").unwrap();

        let pinned = ModelService::new(&path, Some("deadbeef".to_string()));
        assert!(matches!(pinned.get(), Err(ModelError::ChecksumMismatch { .. })));

        let mut manifest = logistic_artifact(0.0).manifest;
        manifest.feature_names.swap(2, 3);
        write_manifest(&path, &manifest);
        let service = ModelService::new(&path, None);
        assert!(matches!(service.get(), Err(ModelError::Layout(_))));
    }
}
