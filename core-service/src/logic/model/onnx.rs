//! ONNX Classifier - Pre-fitted Models via ONNX Runtime
//!
//! Exported XGBoost / scikit-learn classifiers (converted with ZipMap
//! disabled) expose a label output and a `[N, 2]` probability output. The
//! probability output is found by name; the first output is the scalar
//! fallback.

use ndarray::{Array1, Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::artifact::ModelError;
use super::classifier::{check_width, ClassifierError, RiskClassifier};

pub struct OnnxClassifier {
    /// `Session::run` needs `&mut`
    session: Mutex<Session>,
    score_output: String,
    proba_output: Option<String>,
    n_features: usize,
    importances: Option<Vec<f32>>,
}

/// Probability output of a converted classifier, if any
fn find_proba_output<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    names.into_iter().find(|name| name.to_ascii_lowercase().contains("prob"))
}

impl OnnxClassifier {
    /// Build a session from the verified model bytes
    pub fn from_bytes(
        bytes: &[u8],
        n_features: usize,
        importances: Option<Vec<f32>>,
    ) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(|e| ModelError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(bytes)
            .map_err(|e| ModelError::Runtime(format!("Failed to load model: {}", e)))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let score_output = output_names
            .first()
            .cloned()
            .ok_or_else(|| ModelError::Invalid("ONNX graph has no outputs".to_string()))?;
        let proba_output =
            find_proba_output(output_names.iter().map(String::as_str)).map(str::to_string);

        log::info!(
            "ONNX session ready (outputs: {:?}, probability output: {:?})",
            output_names,
            proba_output
        );

        Ok(Self {
            session: Mutex::new(session),
            score_output,
            proba_output,
            n_features,
            importances,
        })
    }

    /// Run the graph on `rows` and copy one output out as f64
    fn run_output(&self, rows: ArrayView2<f32>, output_name: &str) -> Result<Vec<f64>, ClassifierError> {
        check_width(&rows, self.n_features)?;

        let input_tensor = Value::from_array(rows.to_owned())
            .map_err(|e| ClassifierError::Evaluation(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Evaluation(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(output_name)
            .ok_or_else(|| ClassifierError::Evaluation(format!("No output '{}'", output_name)))?;

        // Labels come back as int64, scores and probabilities as float
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|&v| f64::from(v)).collect());
        }
        let (_, data) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| ClassifierError::Evaluation(format!("Extract error: {}", e)))?;
        Ok(data.iter().map(|&v| v as f64).collect())
    }
}

impl RiskClassifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn supports_proba(&self) -> bool {
        self.proba_output.is_some()
    }

    fn predict_proba(&self, rows: ArrayView2<f32>) -> Result<Array2<f64>, ClassifierError> {
        let name = self
            .proba_output
            .as_deref()
            .ok_or(ClassifierError::Unsupported("graph has no probability output"))?;
        let n = rows.nrows();
        let data = self.run_output(rows, name)?;
        proba_matrix(data, n)
    }

    fn predict(&self, rows: ArrayView2<f32>) -> Result<Array1<f64>, ClassifierError> {
        let n = rows.nrows();
        let data = self.run_output(rows, &self.score_output)?;
        if data.len() != n {
            return Err(ClassifierError::Evaluation(format!(
                "expected {} scores, got {}",
                n,
                data.len()
            )));
        }
        Ok(Array1::from(data))
    }

    fn feature_importances(&self) -> Option<&[f32]> {
        self.importances.as_deref()
    }
}

/// Flat probability output → `(n, 2)`. A single column is read as P(default).
fn proba_matrix(data: Vec<f64>, n: usize) -> Result<Array2<f64>, ClassifierError> {
    if n > 0 && data.len() == n {
        return Ok(Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 1 {
                data[i]
            } else {
                1.0 - data[i]
            }
        }));
    }
    Array2::from_shape_vec((n, 2), data)
        .map_err(|e| ClassifierError::Evaluation(format!("probability output shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_proba_output() {
        assert_eq!(find_proba_output(["label", "probabilities"]), Some("probabilities"));
        assert_eq!(
            find_proba_output(["output_label", "output_probability"]),
            Some("output_probability")
        );
        assert_eq!(find_proba_output(["variable"]), None);
    }

    #[test]
    fn test_proba_matrix_two_columns() {
        let m = proba_matrix(vec![0.9, 0.1, 0.3, 0.7], 2).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[0, 1]], 0.1);
        assert_eq!(m[[1, 1]], 0.7);
    }

    #[test]
    fn test_proba_matrix_single_column() {
        let m = proba_matrix(vec![0.25], 1).unwrap();
        assert_eq!(m[[0, 1]], 0.25);
        assert_eq!(m[[0, 0]], 0.75);
    }

    #[test]
    fn test_proba_matrix_bad_shape() {
        assert!(matches!(
            proba_matrix(vec![0.1, 0.2, 0.3], 1),
            Err(ClassifierError::Evaluation(_))
        ));
    }

    #[test]
    fn test_garbage_graph_rejected() {
        let result = OnnxClassifier::from_bytes(b"not an onnx graph", 37, None);
        assert!(matches!(result, Err(ModelError::Runtime(_))));
    }
}
