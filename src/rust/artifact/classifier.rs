use std::collections::HashSet;
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{decode, encode, read_file, ArtifactError, TextClassifier, CLASSIFIER_FORMAT};
use crate::features::FeatureVector;
use crate::labels::ClassKey;

/// Serialized form of a fitted linear classifier.
///
/// Both kinds score a row as `weights · x + bias` per class; they differ in
/// naming and in how a single-row binary model is decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Logistic regression, linear SVM and similar decision-function models
    Linear {
        classes: Vec<ClassKey>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// Multinomial naive Bayes in log space
    MultinomialNb {
        classes: Vec<ClassKey>,
        feature_log_prob: Vec<Vec<f64>>,
        class_log_prior: Vec<f64>,
    },
}

impl ClassifierSpec {
    /// Serializes the spec as a versioned artifact document
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        encode(self, CLASSIFIER_FORMAT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Linear,
    MultinomialNb,
}

/// A fitted linear classifier over sparse feature rows.
#[derive(Debug)]
pub struct LinearClassifier {
    kind: ClassifierKind,
    classes: Vec<ClassKey>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LinearClassifier {
    /// Loads and validates a classifier artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let classifier = Self::from_json(&read_file(path)?)?;
        info!(
            "Loaded {:?} classifier from {:?} ({} classes, {} features)",
            classifier.kind,
            path,
            classifier.classes.len(),
            classifier.weights.ncols()
        );
        Ok(classifier)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        Self::from_spec(decode(bytes, CLASSIFIER_FORMAT)?)
    }

    pub fn from_spec(spec: ClassifierSpec) -> Result<Self, ArtifactError> {
        let (kind, classes, rows, bias) = match spec {
            ClassifierSpec::Linear {
                classes,
                coef,
                intercept,
            } => (ClassifierKind::Linear, classes, coef, intercept),
            ClassifierSpec::MultinomialNb {
                classes,
                feature_log_prob,
                class_log_prior,
            } => (ClassifierKind::MultinomialNb, classes, feature_log_prob, class_log_prior),
        };

        if classes.len() < 2 {
            return Err(ArtifactError::Invalid(format!(
                "Classifier needs at least 2 classes, found {}",
                classes.len()
            )));
        }
        let distinct: HashSet<&ClassKey> = classes.iter().collect();
        if distinct.len() != classes.len() {
            return Err(ArtifactError::Invalid("Duplicate class keys".into()));
        }

        let binary_decision = kind == ClassifierKind::Linear && classes.len() == 2 && rows.len() == 1;
        if !binary_decision && rows.len() != classes.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} weight rows for {} classes",
                rows.len(),
                classes.len()
            )));
        }
        if bias.len() != rows.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} bias terms for {} weight rows",
                bias.len(),
                rows.len()
            )));
        }

        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        if n_features == 0 {
            return Err(ArtifactError::Invalid("Weight rows are empty".into()));
        }
        if let Some(pos) = rows.iter().position(|row| row.len() != n_features) {
            return Err(ArtifactError::Invalid(format!(
                "Weight row {} has {} features, expected {}",
                pos,
                rows[pos].len(),
                n_features
            )));
        }

        let n_rows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        if flat.iter().chain(bias.iter()).any(|w| !w.is_finite()) {
            return Err(ArtifactError::Invalid("Weights contain non-finite values".into()));
        }
        let weights = Array2::from_shape_vec((n_rows, n_features), flat)
            .map_err(|e| ArtifactError::Invalid(format!("Failed to shape weights: {}", e)))?;

        Ok(Self {
            kind,
            classes,
            weights,
            bias: Array1::from(bias),
        })
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    /// Per-row scores: one per class, or a single margin for a binary model
    pub fn decision_function(&self, row: &FeatureVector) -> Result<Array1<f64>, ArtifactError> {
        if row.dim() != self.weights.ncols() {
            return Err(ArtifactError::DimensionMismatch {
                expected: self.weights.ncols(),
                found: row.dim(),
            });
        }
        Ok(self
            .weights
            .outer_iter()
            .zip(self.bias.iter())
            .map(|(weights, bias)| row.dot(weights) + bias)
            .collect())
    }

    /// Predicts the class of one row
    pub fn predict_one(&self, row: &FeatureVector) -> Result<ClassKey, ArtifactError> {
        let scores = self.decision_function(row)?;

        let index = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            // First maximum wins on ties.
            let mut best = 0;
            for (i, &score) in scores.iter().enumerate().skip(1) {
                if score > scores[best] {
                    best = i;
                }
            }
            best
        };

        Ok(self.classes[index].clone())
    }
}

impl TextClassifier for LinearClassifier {
    fn classes(&self) -> &[ClassKey] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<ClassKey>, ArtifactError> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }
}
