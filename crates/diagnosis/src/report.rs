//! Report schema
//!
//! All three shapes serialize flat; `status` is "ok" for analyzed and
//! insufficient-data reports and "error" for failures.

use explanation::Explanation;
use serde::Serialize;
use severity::RowAnomaly;
use telemetry::Channel;

/// Message returned when the cleaned window is too short
pub const NOT_ENOUGH_DATA: &str = "Not enough data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Error,
}

/// Full analysis of a window
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedReport {
    pub status: ReportStatus,
    pub motorcycle_id: String,
    /// Rows left after cleaning
    pub rows_analyzed: usize,
    /// Rows the scanner flagged
    pub anomalies_detected: usize,
    pub anomaly_percent: f64,
    /// Detector verdict over the aggregated window
    pub ml_anomaly: bool,
    pub abnormal_features: Vec<Channel>,
    pub explanations: Vec<Explanation>,
    pub row_anomalies: Vec<RowAnomaly>,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsufficientData {
    pub status: ReportStatus,
    pub motorcycle_id: String,
    pub message: String,
    /// Always empty
    pub explanations: Vec<Explanation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedReport {
    pub status: ReportStatus,
    pub motorcycle_id: String,
    pub error: String,
}

/// Outcome of one diagnosis request
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnomalyReport {
    Analyzed(AnalyzedReport),
    InsufficientData(InsufficientData),
    Failed(FailedReport),
}

impl AnomalyReport {
    pub fn insufficient(motorcycle_id: &str) -> Self {
        AnomalyReport::InsufficientData(InsufficientData {
            status: ReportStatus::Ok,
            motorcycle_id: motorcycle_id.to_string(),
            message: NOT_ENOUGH_DATA.to_string(),
            explanations: Vec::new(),
        })
    }

    pub fn failed(motorcycle_id: &str, error: impl Into<String>) -> Self {
        AnomalyReport::Failed(FailedReport {
            status: ReportStatus::Error,
            motorcycle_id: motorcycle_id.to_string(),
            error: error.into(),
        })
    }

    pub fn status(&self) -> ReportStatus {
        match self {
            AnomalyReport::Analyzed(r) => r.status,
            AnomalyReport::InsufficientData(r) => r.status,
            AnomalyReport::Failed(r) => r.status,
        }
    }

    pub fn motorcycle_id(&self) -> &str {
        match self {
            AnomalyReport::Analyzed(r) => &r.motorcycle_id,
            AnomalyReport::InsufficientData(r) => &r.motorcycle_id,
            AnomalyReport::Failed(r) => &r.motorcycle_id,
        }
    }

    /// Label used for the reports counter
    pub fn outcome(&self) -> &'static str {
        match self {
            AnomalyReport::Analyzed(_) => "analyzed",
            AnomalyReport::InsufficientData(_) => "insufficient_data",
            AnomalyReport::Failed(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        self.status() == ReportStatus::Error
    }
}
