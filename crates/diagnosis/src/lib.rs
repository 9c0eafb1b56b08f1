//! Idle Diagnostics
//!
//! Orchestrates one diagnosis request end to end and packages the outcome
//! into a report. Failures become error reports; nothing unwinds into the
//! caller.

mod pipeline;
mod report;
mod suggestion;
pub mod summary;

pub use pipeline::{
    AnomalyPipeline, DiagnosisRequest, PipelineConfig, Stage, DEFAULT_MINUTES, DEFAULT_MIN_ROWS,
    DEFAULT_MODE,
};
pub use report::{
    AnalyzedReport, AnomalyReport, FailedReport, InsufficientData, ReportStatus, NOT_ENOUGH_DATA,
};
pub use suggestion::{suggest, ALL_NORMAL};

use feature_engine::FeatureError;
use inference_engine::InferenceError;
use storage::SourceError;
use thiserror::Error;

/// Faults that end a diagnosis early
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("internal error: {0}")]
    Panic(String),
}
