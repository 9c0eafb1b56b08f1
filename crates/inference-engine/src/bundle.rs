//! Model Bundle
//!
//! A fitted scaler paired with the outlier detector trained on its output.

use crate::forest::IsolationForest;
use crate::scaler::StandardScaler;
use crate::InferenceError;
use feature_engine::{FeatureVector, Transformer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Detector verdict for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Anomaly,
    Normal,
}

impl Label {
    /// Conventional outlier encoding: -1 anomaly, 1 normal
    pub fn as_i8(&self) -> i8 {
        match self {
            Label::Anomaly => -1,
            Label::Normal => 1,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, Label::Anomaly)
    }
}

/// Unsupervised outlier detector over the aggregated feature vector
pub trait Detector: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Label;
}

/// On-disk artifact layout
#[derive(Debug, Deserialize)]
struct Artifact {
    model: IsolationForest,
    scaler: StandardScaler,
}

/// Scaler and detector loaded for one vehicle
pub struct ModelBundle {
    scaler: Box<dyn Transformer>,
    detector: Box<dyn Detector>,
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle").finish_non_exhaustive()
    }
}

impl ModelBundle {
    /// Pair an arbitrary scaler and detector
    pub fn new(scaler: Box<dyn Transformer>, detector: Box<dyn Detector>) -> Self {
        Self { scaler, detector }
    }

    /// Read and validate a JSON artifact with `model` and `scaler` members
    pub fn from_artifact(path: &Path) -> Result<Self, InferenceError> {
        if !path.is_file() {
            return Err(InferenceError::ModelNotFound(path.to_path_buf()));
        }

        let invalid = |reason: String| InferenceError::ModelSchemaInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let artifact: Artifact =
            serde_json::from_slice(&bytes).map_err(|e| invalid(e.to_string()))?;
        artifact.scaler.validate().map_err(invalid)?;
        artifact.model.validate().map_err(invalid)?;

        debug!(
            "Loaded artifact {} ({} trees, max_samples={})",
            path.display(),
            artifact.model.trees.len(),
            artifact.model.max_samples
        );

        Ok(Self::new(Box::new(artifact.scaler), Box::new(artifact.model)))
    }

    pub fn scaler(&self) -> &dyn Transformer {
        self.scaler.as_ref()
    }

    pub fn detector(&self) -> &dyn Detector {
        self.detector.as_ref()
    }
}
