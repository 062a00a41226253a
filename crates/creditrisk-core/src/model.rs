// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Scoring Model Interface
// ─────────────────────────────────────────────────────────────────────
//! Scoring model trait and the logistic model loaded from disk.
//!
//! The trained model is produced outside this service. `LogisticModel`
//! reads an exported `model.json` (input schema, optional threshold,
//! coefficients and preprocessing vectors). Other runtimes plug in
//! through [`ExternalModel`].

use std::path::Path;

use serde::Deserialize;

use creditrisk_types::{RiskError, RiskResult};

/// File inside the model directory holding the exported parameters.
pub const MODEL_FILE: &str = "model.json";

/// Dense row-major matrix handed to [`ScoringModel::predict`].
///
/// Missing inputs are `NaN`; the model decides how to impute them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, data: Vec<f64>) -> RiskResult<Self> {
        let width = columns.len();
        if width == 0 && !data.is_empty() {
            return Err(RiskError::Transform("matrix has data but no columns".into()));
        }
        if width > 0 && data.len() % width != 0 {
            return Err(RiskError::Transform(format!(
                "matrix data length {} is not a multiple of {width} columns",
                data.len()
            )));
        }
        Ok(Self { columns, data })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.data.len() / self.columns.len()
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let w = self.n_cols();
        &self.data[i * w..(i + 1) * w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on 0
        self.data.chunks_exact(self.n_cols().max(1))
    }
}

/// Trait for scoring model backends.
pub trait ScoringModel: Send + Sync {
    /// Ordered feature names the model's input schema requires.
    fn expected_features(&self) -> &[String];

    /// Decision cutoff in `[0, 1]`.
    fn threshold(&self) -> f64;

    /// One `[prob_negative, prob_positive]` pair per matrix row.
    fn predict(&self, matrix: &FeatureMatrix) -> RiskResult<Vec<[f64; 2]>>;
}

#[derive(Debug, Deserialize)]
struct ModelMetadata {
    optimal_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    input_schema: Vec<String>,
    #[serde(default)]
    metadata: Option<ModelMetadata>,
    intercept: f64,
    coefficients: Vec<f64>,
    #[serde(default)]
    impute: Option<Vec<f64>>,
    #[serde(default)]
    center: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

/// Standardize-then-logistic scorer.
///
/// `p = sigmoid(intercept + Σ coef_j * (x_j - center_j) / scale_j)`, with
/// missing `x_j` replaced by `impute_j`.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    features: Vec<String>,
    threshold: f64,
    intercept: f64,
    coefficients: Vec<f64>,
    impute: Vec<f64>,
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl LogisticModel {
    /// Load `<dir>/model.json`. `default_threshold` applies when the
    /// metadata carries no `optimal_threshold`.
    pub fn load(dir: &Path, default_threshold: f64) -> RiskResult<Self> {
        let path = dir.join(MODEL_FILE);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            RiskError::ModelLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text, default_threshold)
    }

    pub fn from_json(json: &str, default_threshold: f64) -> RiskResult<Self> {
        let file: ModelFile = serde_json::from_str(json)
            .map_err(|e| RiskError::ModelLoad(format!("JSON parse error: {e}")))?;
        let n = file.input_schema.len();
        if n == 0 {
            return Err(RiskError::ModelLoad("input_schema is empty".into()));
        }

        let check_len = |name: &str, v: &[f64]| {
            if v.len() == n {
                Ok(())
            } else {
                Err(RiskError::ModelLoad(format!(
                    "{name} has {} entries, input_schema has {n}",
                    v.len()
                )))
            }
        };
        check_len("coefficients", &file.coefficients)?;
        let impute = file.impute.unwrap_or_else(|| vec![0.0; n]);
        let center = file.center.unwrap_or_else(|| vec![0.0; n]);
        let scale = file.scale.unwrap_or_else(|| vec![1.0; n]);
        check_len("impute", &impute)?;
        check_len("center", &center)?;
        check_len("scale", &scale)?;
        if let Some(j) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(RiskError::ModelLoad(format!(
                "scale for '{}' must be finite and non-zero",
                file.input_schema[j]
            )));
        }

        let threshold = file
            .metadata
            .and_then(|m| m.optimal_threshold)
            .unwrap_or(default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RiskError::ModelLoad(format!(
                "threshold must be in [0, 1], got {threshold}"
            )));
        }

        Ok(Self {
            features: file.input_schema,
            threshold,
            intercept: file.intercept,
            coefficients: file.coefficients,
            impute,
            center,
            scale,
        })
    }

    fn probability(&self, row: &[f64]) -> f64 {
        let mut z = self.intercept;
        for j in 0..row.len() {
            let x = if row[j].is_finite() { row[j] } else { self.impute[j] };
            z += self.coefficients[j] * (x - self.center[j]) / self.scale[j];
        }
        sigmoid(z)
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z.clamp(-500.0, 500.0)).exp())
}

impl ScoringModel for LogisticModel {
    fn expected_features(&self) -> &[String] {
        &self.features
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn predict(&self, matrix: &FeatureMatrix) -> RiskResult<Vec<[f64; 2]>> {
        if matrix.columns() != self.features.as_slice() {
            return Err(RiskError::Prediction(format!(
                "matrix columns {:?} do not match model input schema {:?}",
                matrix.columns(),
                self.features
            )));
        }
        Ok(matrix
            .rows()
            .map(|row| {
                let p = self.probability(row);
                [1.0 - p, p]
            })
            .collect())
    }
}

/// Prediction closure used by [`ExternalModel`].
type PredictFn = Box<dyn Fn(&FeatureMatrix) -> RiskResult<Vec<[f64; 2]>> + Send + Sync>;

/// Model backed by a closure, for embedding other runtimes and for tests.
pub struct ExternalModel {
    features: Vec<String>,
    threshold: f64,
    predict_fn: PredictFn,
}

impl ExternalModel {
    pub fn new(
        features: Vec<String>,
        threshold: f64,
        predict_fn: impl Fn(&FeatureMatrix) -> RiskResult<Vec<[f64; 2]>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            features,
            threshold,
            predict_fn: Box::new(predict_fn),
        }
    }
}

impl ScoringModel for ExternalModel {
    fn expected_features(&self) -> &[String] {
        &self.features
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn predict(&self, matrix: &FeatureMatrix) -> RiskResult<Vec<[f64; 2]>> {
        (self.predict_fn)(matrix)
    }
}
