//! Pretrained classifier artifacts and the adapter that feeds them.
//!
//! An artifact maps a fixed-length feature vector to a discrete label. The
//! adapter assembles the vector from landmark coordinates in the order the
//! profile binding declares, checks its length against the artifact, and
//! turns the label into named flags.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use repform_core::{Error, LandmarkSet, Result};

use crate::config::EngineConfig;
use crate::profile::ClassifierBinding;

/// Pretrained model safe to call from many threads at once
pub trait Classifier: Send + Sync {
    /// Length of the feature vector the model was trained on
    fn input_len(&self) -> usize;

    /// Predict a label for one feature vector
    fn predict(&self, features: &[f64]) -> Result<usize>;
}

/// Pretrained model that needs exclusive access while predicting
pub trait ExclusiveModel: Send {
    fn input_len(&self) -> usize;

    fn predict(&mut self, features: &[f64]) -> Result<usize>;
}

/// Shares an [`ExclusiveModel`] by locking around each inference call only
pub struct SerializedClassifier<M> {
    input_len: usize,
    model: Mutex<M>,
}

impl<M: ExclusiveModel> SerializedClassifier<M> {
    pub fn new(model: M) -> Self {
        Self {
            input_len: model.input_len(),
            model: Mutex::new(model),
        }
    }
}

impl<M: ExclusiveModel> Classifier for SerializedClassifier<M> {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn predict(&self, features: &[f64]) -> Result<usize> {
        self.model.lock().predict(features)
    }
}

/// On-disk form of a [`LinearClassifier`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearArtifact {
    /// One row of weights per class
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Multinomial linear model: the label is the class with the highest score
/// `W·x + b`.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

impl LinearClassifier {
    pub fn new(weights: DMatrix<f64>, bias: DVector<f64>) -> Result<Self> {
        if weights.nrows() == 0 || weights.ncols() == 0 {
            return Err(Error::Config("linear classifier has no weights".to_string()));
        }
        if weights.nrows() != bias.len() {
            return Err(Error::Config(format!(
                "linear classifier has {} weight rows but {} biases",
                weights.nrows(),
                bias.len()
            )));
        }
        Ok(Self { weights, bias })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: LinearArtifact = serde_json::from_str(json)?;

        let n_classes = artifact.weights.len();
        let n_features = artifact.weights.first().map(Vec::len).unwrap_or(0);
        if let Some(row) = artifact.weights.iter().position(|r| r.len() != n_features) {
            return Err(Error::Config(format!(
                "weight row {row} has {} values, expected {n_features}",
                artifact.weights[row].len()
            )));
        }

        let weights = DMatrix::from_row_iterator(
            n_classes,
            n_features,
            artifact.weights.into_iter().flatten(),
        );
        Self::new(weights, DVector::from_vec(artifact.bias))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn n_classes(&self) -> usize {
        self.weights.nrows()
    }
}

impl Classifier for LinearClassifier {
    fn input_len(&self) -> usize {
        self.weights.ncols()
    }

    fn predict(&self, features: &[f64]) -> Result<usize> {
        if features.len() != self.input_len() {
            return Err(Error::FeatureShapeMismatch {
                expected: self.input_len(),
                actual: features.len(),
            });
        }

        let x = DVector::from_column_slice(features);
        let scores = &self.weights * x + &self.bias;

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(Error::InferenceFailed("non-finite class score".to_string()));
        }

        // First maximum wins, so ties resolve to the lower label
        let mut best = 0;
        for (label, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = label;
            }
        }
        Ok(best)
    }
}

/// Process-wide set of loaded artifacts, keyed by name
#[derive(Default)]
pub struct ClassifierStore {
    artifacts: HashMap<String, Arc<dyn Classifier>>,
}

impl ClassifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every artifact listed in the configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut store = Self::new();
        for entry in &config.classifiers {
            let classifier = LinearClassifier::load(&entry.path).map_err(|e| {
                Error::Config(format!(
                    "classifier '{}' at {}: {e}",
                    entry.name,
                    entry.path.display()
                ))
            })?;

            tracing::info!(
                "Loaded classifier '{}' ({} classes, {} inputs)",
                entry.name,
                classifier.n_classes(),
                classifier.input_len()
            );
            store.insert(&entry.name, Arc::new(classifier));
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: &str, classifier: Arc<dyn Classifier>) {
        self.artifacts.insert(name.to_string(), classifier);
    }

    pub fn with(mut self, name: &str, classifier: Arc<dyn Classifier>) -> Self {
        self.insert(name, classifier);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Classifier>> {
        self.artifacts.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Binds one profile's classifier declaration to a loaded artifact
pub struct ClassifierAdapter<'a> {
    binding: &'a ClassifierBinding,
    classifier: &'a dyn Classifier,
}

impl<'a> ClassifierAdapter<'a> {
    pub fn new(binding: &'a ClassifierBinding, classifier: &'a dyn Classifier) -> Self {
        Self {
            binding,
            classifier,
        }
    }

    /// Concatenate (x, y, z) of each feature landmark in binding order
    pub fn features(&self, landmarks: &LandmarkSet) -> Result<Vec<f64>> {
        let mut features = Vec::with_capacity(self.binding.feature_len());
        for part in &self.binding.features {
            let p = landmarks.point(*part)?;
            features.extend([p.x, p.y, p.z]);
        }
        Ok(features)
    }

    /// Run the artifact and map its label to flags.
    ///
    /// Exactly one flag is raised: the one bound to the predicted label.
    pub fn classify(&self, features: &[f64]) -> Result<BTreeMap<String, bool>> {
        let expected = self.classifier.input_len();
        if features.len() != expected {
            return Err(Error::FeatureShapeMismatch {
                expected,
                actual: features.len(),
            });
        }

        let label = self.classifier.predict(features).map_err(|e| match e {
            Error::InferenceFailed(_) | Error::FeatureShapeMismatch { .. } => e,
            other => Error::InferenceFailed(other.to_string()),
        })?;

        if label >= self.binding.labels.len() {
            return Err(Error::InferenceFailed(format!(
                "artifact '{}' returned label {label}, only {} are mapped",
                self.binding.artifact,
                self.binding.labels.len()
            )));
        }

        Ok(self
            .binding
            .labels
            .iter()
            .enumerate()
            .map(|(i, flag)| (flag.clone(), i == label))
            .collect())
    }

    pub fn run(&self, landmarks: &LandmarkSet) -> Result<BTreeMap<String, bool>> {
        let features = self.features(landmarks)?;
        self.classify(&features)
    }
}
