//! Idle Diagnostics API Server
//!
//! REST API for the maintenance dashboard: on-demand anomaly reports,
//! telemetry ingest, and daily/weekly summaries.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
mod routes;

pub use config::{AnalysisConfig, AppConfig, LoggingConfig};
pub use error::{ApiError, ApiResult};

use diagnosis::{AnomalyPipeline, DiagnosisRequest, PipelineConfig};
use inference_engine::ModelCache;
use severity::{RangeError, ReferenceTable};
use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Anomaly pipeline (owns the reference table and model cache)
    pub pipeline: AnomalyPipeline,
    /// Live telemetry store
    pub repository: Repository,
    /// Request defaults
    pub analysis: AnalysisConfig,
    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig, ranges: ReferenceTable) -> Self {
        let models = Arc::new(ModelCache::new(config.models.root_dir.clone()));
        let pipeline_config = PipelineConfig {
            min_rows: config.analysis.min_rows,
            ..PipelineConfig::default()
        };

        Self {
            pipeline: AnomalyPipeline::new(Arc::new(ranges), models, pipeline_config),
            repository: Repository::new(),
            analysis: config.analysis.clone(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build a pipeline request, filling mode and window length from config
    pub fn request(
        &self,
        motorcycle_id: String,
        brand: String,
        model: String,
        mode: Option<String>,
        minutes: Option<u32>,
    ) -> DiagnosisRequest {
        DiagnosisRequest {
            motorcycle_id,
            brand,
            model,
            mode: mode.unwrap_or_else(|| self.analysis.default_mode.clone()),
            minutes: minutes.unwrap_or(self.analysis.default_minutes),
        }
    }
}

/// Load the reference table named in config; no path means an empty table
pub fn load_ranges(config: &AppConfig) -> Result<ReferenceTable, RangeError> {
    match &config.ranges.path {
        Some(path) => ReferenceTable::from_file(path),
        None => {
            warn!("No reference range file configured; all channels will report unknown");
            Ok(ReferenceTable::empty())
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models_loaded: usize,
}

/// Create the application router
pub fn create_router(state: SharedState, cors: bool) -> Router {
    let router = Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/api/v1/predict/csv", post(routes::predict::predict_csv))
        .route("/api/v1/telemetry", post(routes::telemetry::ingest))
        .route("/api/v1/telemetry/latest", get(routes::telemetry::latest))
        .route("/api/v1/reports/daily", get(routes::reports::daily))
        .route("/api/v1/reports/weekly", get(routes::reports::weekly))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models_loaded: state.pipeline.models().len(),
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let ranges = load_ranges(&config)?;
    let handle = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(&config, ranges).with_metrics(handle));
    let app = create_router(state, config.server.cors);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
