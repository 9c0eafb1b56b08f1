//! Anomaly Pipeline
//!
//! fetch → clean → gate → infer → explain → scan → finalize. Every request
//! yields a report; errors and panics inside any stage are turned into an
//! error report at the top.

use crate::report::{AnalyzedReport, AnomalyReport, ReportStatus};
use crate::suggestion::suggest;
use crate::DiagnosisError;
use data_validator::{CleanerConfig, WindowCleaner};
use explanation::{abnormal_features, ExplanationSynthesizer};
use feature_engine::FeatureAggregator;
use inference_engine::{ModelCache, ModelKey};
use serde::{Deserialize, Serialize};
use severity::{ReferenceTable, RowScanner, SeverityClassifier};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use storage::WindowSource;
use tracing::{debug, info, warn};

/// Rows required after cleaning before any analysis runs
pub const DEFAULT_MIN_ROWS: usize = 30;
/// Window length when the caller does not give one
pub const DEFAULT_MINUTES: u32 = 30;
/// Operating mode models are trained for
pub const DEFAULT_MODE: &str = "idle";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum cleaned rows to analyse
    pub min_rows: usize,
    /// Row cleaning rules
    pub cleaner: CleanerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
            cleaner: CleanerConfig::default(),
        }
    }
}

/// One diagnosis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub motorcycle_id: String,
    pub brand: String,
    pub model: String,
    pub mode: String,
    pub minutes: u32,
}

impl DiagnosisRequest {
    /// Request with the default mode and window length
    pub fn new(motorcycle_id: &str, brand: &str, model: &str) -> Self {
        Self {
            motorcycle_id: motorcycle_id.to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            mode: DEFAULT_MODE.to_string(),
            minutes: DEFAULT_MINUTES,
        }
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }
}

/// Pipeline stages, logged on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Clean,
    Gate,
    Infer,
    Explain,
    Scan,
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Clean => "clean",
            Stage::Gate => "gate",
            Stage::Infer => "infer",
            Stage::Explain => "explain",
            Stage::Scan => "scan",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: Stage, motorcycle_id: &str) {
    debug!("[{}] stage {}", motorcycle_id, stage);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Idle anomaly pipeline; shared across requests
pub struct AnomalyPipeline {
    classifier: SeverityClassifier,
    models: Arc<ModelCache>,
    cleaner: WindowCleaner,
    aggregator: FeatureAggregator,
    config: PipelineConfig,
}

impl AnomalyPipeline {
    pub fn new(
        ranges: Arc<ReferenceTable>,
        models: Arc<ModelCache>,
        config: PipelineConfig,
    ) -> Self {
        info!(
            "Creating anomaly pipeline: {} reference ranges, models under {}, min_rows={}",
            ranges.len(),
            models.root().display(),
            config.min_rows
        );
        Self {
            classifier: SeverityClassifier::new(ranges),
            models,
            cleaner: WindowCleaner::new(config.cleaner.clone()),
            aggregator: FeatureAggregator::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn models(&self) -> &Arc<ModelCache> {
        &self.models
    }

    /// Diagnose one motorcycle. Never fails and never panics into the caller.
    pub fn run(&self, source: &dyn WindowSource, request: &DiagnosisRequest) -> AnomalyReport {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.analyze(source, request)))
            .unwrap_or_else(|payload| Err(DiagnosisError::Panic(panic_message(payload.as_ref()))));

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!("Diagnosis failed for {}: {}", request.motorcycle_id, e);
                AnomalyReport::failed(&request.motorcycle_id, e.to_string())
            }
        };

        metrics::counter!("diagnosis_reports_total", "outcome" => report.outcome()).increment(1);
        info!("Diagnosis for {} finished: {}", request.motorcycle_id, report.outcome());
        report
    }

    fn analyze(
        &self,
        source: &dyn WindowSource,
        request: &DiagnosisRequest,
    ) -> Result<AnomalyReport, DiagnosisError> {
        let id = request.motorcycle_id.as_str();

        enter(Stage::Fetch, id);
        let raw = source.fetch(id, request.minutes)?;

        enter(Stage::Clean, id);
        let window = self.cleaner.clean(raw);

        enter(Stage::Gate, id);
        if !window.meets(self.config.min_rows) {
            info!(
                "Not enough data for {}: {} usable rows, need {}",
                id,
                window.len(),
                self.config.min_rows
            );
            return Ok(AnomalyReport::insufficient(id));
        }

        enter(Stage::Infer, id);
        let key = ModelKey::new(&request.brand, id, &request.mode)?;
        let bundle = self.models.get(&key)?;
        let features = self.aggregator.aggregate(&window.rows, bundle.scaler())?;
        let label = bundle.detector().predict(&features);
        debug!("[{}] detector label {}", id, label.as_i8());

        enter(Stage::Explain, id);
        let synthesizer =
            ExplanationSynthesizer::new(&self.classifier, &request.brand, &request.model);
        let explanations = synthesizer.explain(&window.rows);
        let abnormal = abnormal_features(&explanations);

        enter(Stage::Scan, id);
        let scan =
            RowScanner::new(&self.classifier, &request.brand, &request.model).scan(&window.rows);

        enter(Stage::Finalize, id);
        let suggestion = suggest(&explanations, label.is_anomaly());

        Ok(AnomalyReport::Analyzed(AnalyzedReport {
            status: ReportStatus::Ok,
            motorcycle_id: id.to_string(),
            rows_analyzed: window.len(),
            anomalies_detected: scan.rows_with_issues(),
            anomaly_percent: scan.anomaly_percent(),
            ml_anomaly: label.is_anomaly(),
            abnormal_features: abnormal,
            explanations,
            row_anomalies: scan.anomalies,
            suggestion,
        }))
    }
}
