//! Rule-Based Severity Engine
//!
//! Reference ranges per brand and model, threshold classification with a
//! 0–100 severity score, and a row-by-row scanner that works independently
//! of the learned model.

mod classifier;
mod ranges;
mod scanner;

pub use classifier::{
    classify, score, Assessment, Classification, SeverityClassifier, UNKNOWN_SCORE,
};
pub use ranges::{ReferenceRange, ReferenceTable};
pub use scanner::{round2, RowAnomaly, RowScanner, ScanResult};

use thiserror::Error;

/// Errors raised while loading or querying reference ranges
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("no reference range for {brand}/{model}/{feature}")]
    ReferenceMissing {
        brand: String,
        model: String,
        feature: String,
    },
    #[error("invalid range for {feature}: expected critical_min <= warning_min <= warning_max <= critical_max")]
    InvalidRange { feature: String },
    #[error("unknown feature in reference table: {0}")]
    UnknownFeature(String),
    #[error("failed to load reference ranges: {0}")]
    Load(#[from] config::ConfigError),
}
