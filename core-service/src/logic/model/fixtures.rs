//! Test fixtures: model artifacts on disk

use std::path::{Path, PathBuf};

use super::artifact::{manifest_path, ClassifierSpec, ModelArtifact, ModelManifest};
use super::classifier::{Objective, Tree, TreeNode};
use crate::logic::features::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::features::CategoryEncodings;

/// Tables covering the default sample applicant
pub fn encodings() -> CategoryEncodings {
    CategoryEncodings::new()
        .with_values("grade", &["A", "B", "C", "D", "E", "F", "G"])
        .with_values("sub_grade", &["A1", "A2", "A3", "A4", "A5", "B1", "C1"])
        .with_values("home_ownership", &["MORTGAGE", "OWN", "RENT"])
        .with_values("verification_status", &["Not Verified", "Source Verified", "Verified"])
        .with_values("purpose", &["car", "credit_card", "debt_consolidation", "small_business"])
        .with_values("application_type", &["Individual", "Joint App"])
        .with_values("financial_state", &["Crisis", "Stable", "Stress"])
}

/// int_rate > grade > initial_fico_score > dti > annual_inc, rest 0.01
pub fn importances() -> Vec<f32> {
    let mut values = vec![0.01f32; FEATURE_COUNT];
    values[2] = 0.30;
    values[4] = 0.20;
    values[20] = 0.15;
    values[11] = 0.08;
    values[8] = 0.06;
    values
}

/// Constant-probability logistic model: every coefficient is 0
pub fn logistic_artifact(intercept: f64) -> ModelArtifact {
    ModelArtifact {
        manifest: ModelManifest {
            name: "credit_logistic".to_string(),
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            layout_hash: Some(layout_hash()),
            encodings: encodings(),
            feature_importances: Some(importances()),
        },
        classifier: ClassifierSpec::Logistic {
            intercept,
            coefficients: vec![0.0; FEATURE_COUNT],
        },
    }
}

/// Single-leaf regression ensemble returning `value`
pub fn regression_artifact(value: f64) -> ModelArtifact {
    ModelArtifact {
        manifest: ModelManifest {
            name: "credit_regressor".to_string(),
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            layout_hash: None,
            encodings: encodings(),
            feature_importances: None,
        },
        classifier: ClassifierSpec::GradientBoosted {
            base_score: 0.0,
            objective: Objective::SquaredError,
            trees: vec![Tree {
                nodes: vec![TreeNode::Leaf { value }],
            }],
        },
    }
}

pub fn write_artifact(dir: &Path, artifact: &ModelArtifact) -> PathBuf {
    let path = dir.join("credit_model.json");
    let bytes = serde_json::to_vec_pretty(artifact).expect("serialize artifact");
    std::fs::write(&path, bytes).expect("write artifact");
    path
}

/// Sidecar manifest next to `model_path`
pub fn write_manifest(model_path: &Path, manifest: &ModelManifest) -> PathBuf {
    let path = manifest_path(model_path);
    let bytes = serde_json::to_vec_pretty(manifest).expect("serialize manifest");
    std::fs::write(&path, bytes).expect("write manifest");
    path
}
