//! Risk Classifier - Pluggable Scoring Models
//!
//! The pipeline only sees `RiskClassifier`. Production models are ONNX
//! graphs (see `onnx`). The logistic model and the gradient-boosted tree
//! ensemble here are evaluated in-crate from JSON artifacts.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Classifier produced a non-finite value")]
    NonFinite,

    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Binary default classifier over encoded feature rows
pub trait RiskClassifier: Send + Sync {
    /// Short model family name for status output
    fn kind(&self) -> &'static str;

    fn n_features(&self) -> usize;

    /// Whether `predict_proba` is available
    fn supports_proba(&self) -> bool;

    /// One row per input; column 0 = no default, column 1 = default
    fn predict_proba(&self, rows: ArrayView2<f32>) -> Result<Array2<f64>, ClassifierError>;

    /// One scalar per input
    fn predict(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError>;

    /// Per-feature importances in layout order, if the model has them
    fn feature_importances(&self) -> Option<&[f32]> {
        None
    }
}

pub(crate) fn check_width(rows: &ArrayView2<f32>, expected: usize) -> Result<(), ClassifierError> {
    let actual = rows.ncols();
    if actual != expected {
        return Err(ClassifierError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `[1 - p, p]` per row
fn two_class(probs: Array1<f64>) -> Array2<f64> {
    let n = probs.len();
    Array2::from_shape_fn((n, 2), |(i, j)| if j == 1 { probs[i] } else { 1.0 - probs[i] })
}

fn labels(probs: &Array1<f64>) -> Array1<f64> {
    probs.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 })
}

// ============================================================================
// LOGISTIC MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    intercept: f64,
    coefficients: Array1<f64>,
    importances: Option<Vec<f32>>,
}

impl LogisticClassifier {
    pub fn new(intercept: f64, coefficients: Vec<f64>, importances: Option<Vec<f32>>) -> Self {
        Self {
            intercept,
            coefficients: Array1::from(coefficients),
            importances,
        }
    }

    fn margins(&self, rows: &ArrayView2<f32>) -> Array1<f64> {
        rows.map_axis(Axis(1), |row| {
            self.intercept
                + row
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(x, c)| *x as f64 * c)
                    .sum::<f64>()
        })
    }

    fn probabilities(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError> {
        check_width(&rows, self.coefficients.len())?;
        Ok(self.margins(&rows).mapv(sigmoid))
    }
}

impl RiskClassifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn supports_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, rows: ArrayView2<f32>) -> Result<Array2<f64>, ClassifierError> {
        Ok(two_class(self.probabilities(rows)?))
    }

    fn predict(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError> {
        Ok(labels(&self.probabilities(rows)?))
    }

    fn feature_importances(&self) -> Option<&[f32]> {
        self.importances.as_deref()
    }
}

// ============================================================================
// GRADIENT-BOOSTED TREES
// ============================================================================

/// Training objective, decides how margins are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Margin → sigmoid → probability
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    /// Margin is the prediction; no probabilities
    #[serde(rename = "reg:squarederror")]
    SquaredError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] < threshold` goes left; missing values follow `missing_left`
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        #[serde(default = "default_missing_left")]
        missing_left: bool,
    },
    Leaf { value: f64 },
}

fn default_missing_left() -> bool {
    true
}

/// Flat node list, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Structural check: children in range, features below `n_features`
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { feature, left, right, .. } = node {
                if *feature >= n_features {
                    return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
                }
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(format!("node {} points outside the tree", i));
                }
                if *left <= i || *right <= i {
                    return Err(format!("node {} points backwards", i));
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `row`
    pub fn evaluate(&self, row: ArrayView1<f32>) -> Result<f64, ClassifierError> {
        let mut idx = 0;
        // Children always point forward, so at most nodes.len() steps
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split { feature, threshold, left, right, missing_left }) => {
                    let x = row.get(*feature).copied().ok_or_else(|| {
                        ClassifierError::Evaluation(format!("feature {} out of range", feature))
                    })?;
                    idx = if x.is_nan() {
                        if *missing_left { *left } else { *right }
                    } else if x < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => {
                    return Err(ClassifierError::Evaluation(format!("node {} does not exist", idx)))
                }
            }
        }
        Err(ClassifierError::Evaluation("tree walk did not reach a leaf".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostedClassifier {
    base_score: f64,
    objective: Objective,
    trees: Vec<Tree>,
    n_features: usize,
    importances: Option<Vec<f32>>,
}

impl GradientBoostedClassifier {
    pub fn new(
        base_score: f64,
        objective: Objective,
        trees: Vec<Tree>,
        n_features: usize,
        importances: Option<Vec<f32>>,
    ) -> Self {
        Self {
            base_score,
            objective,
            trees,
            n_features,
            importances,
        }
    }

    /// Base score plus the sum of leaf values, per row
    fn margins(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError> {
        check_width(&rows, self.n_features)?;
        let mut out = Array1::from_elem(rows.nrows(), self.base_score);
        for (i, row) in rows.outer_iter().enumerate() {
            for tree in &self.trees {
                out[i] += tree.evaluate(row)?;
            }
        }
        Ok(out)
    }
}

impl RiskClassifier for GradientBoostedClassifier {
    fn kind(&self) -> &'static str {
        "gradient_boosted"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn supports_proba(&self) -> bool {
        self.objective == Objective::BinaryLogistic
    }

    fn predict_proba(&self, rows: ArrayView2<f32>) -> Result<Array2<f64>, ClassifierError> {
        match self.objective {
            Objective::BinaryLogistic => Ok(two_class(self.margins(rows)?.mapv(sigmoid))),
            Objective::SquaredError => Err(ClassifierError::Unsupported(
                "predict_proba on a regression objective",
            )),
        }
    }

    fn predict(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError> {
        let margins = self.margins(rows)?;
        Ok(match self.objective {
            Objective::BinaryLogistic => labels(&margins.mapv(sigmoid)),
            Objective::SquaredError => margins,
        })
    }

    fn feature_importances(&self) -> Option<&[f32]> {
        self.importances.as_deref()
    }
}

// ============================================================================
// TESTS
// ============================================================================
