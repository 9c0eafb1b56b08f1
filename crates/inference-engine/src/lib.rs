//! Per-Vehicle Inference Engine
//!
//! Loads (scaler, detector) bundles from JSON artifacts, one per
//! (brand, motorcycle, mode), and keeps them cached for the process lifetime.

mod bundle;
mod cache;
mod forest;
mod scaler;

pub use bundle::{Detector, Label, ModelBundle};
pub use cache::{ModelCache, ModelKey, ARTIFACT_EXTENSION};
pub use forest::{average_path_length, IsolationForest, IsolationTree, Node, DEFAULT_OFFSET};
pub use scaler::StandardScaler;

use std::path::PathBuf;
use thiserror::Error;

/// Errors while resolving or loading model artifacts
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model artifact not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("model artifact {} is invalid: {reason}", .path.display())]
    ModelSchemaInvalid { path: PathBuf, reason: String },
    #[error("invalid model key component: {0:?}")]
    InvalidKey(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
}
