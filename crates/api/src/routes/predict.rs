//! Prediction Routes
//!
//! The pipeline is synchronous and may read model files, so each request
//! runs on the blocking pool.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use diagnosis::AnomalyReport;
use serde::Deserialize;
use storage::csv_source;
use tracing::debug;

use crate::error::{required, ApiError, ApiResult};
use crate::SharedState;

/// Body of `POST /api/v1/predict`
#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub motorcycle_id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub mode: Option<String>,
    pub minutes: Option<u32>,
}

/// Query of `POST /api/v1/predict/csv`
#[derive(Debug, Deserialize)]
pub struct CsvQuery {
    pub motorcycle_id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub mode: Option<String>,
}

async fn run_blocking<F>(job: F) -> ApiResult<AnomalyReport>
where
    F: FnOnce() -> AnomalyReport + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::Internal(format!("diagnosis task failed: {}", e)))
}

/// Diagnose the live window of a motorcycle
pub async fn predict(
    State(state): State<SharedState>,
    Json(body): Json<PredictBody>,
) -> ApiResult<Json<AnomalyReport>> {
    let request = state.request(
        required(body.motorcycle_id, "motorcycle_id")?,
        required(body.brand, "brand")?,
        required(body.model, "model")?,
        body.mode,
        body.minutes,
    );
    debug!("Predict request: {:?}", request);

    let report = run_blocking(move || state.pipeline.run(&state.repository, &request)).await?;

    Ok(Json(report))
}

/// Diagnose an uploaded CSV window
pub async fn predict_csv(
    State(state): State<SharedState>,
    Query(params): Query<CsvQuery>,
    body: Bytes,
) -> ApiResult<Json<AnomalyReport>> {
    let request = state.request(
        required(params.motorcycle_id, "motorcycle_id")?,
        required(params.brand, "brand")?,
        required(params.model, "model")?,
        params.mode,
        None,
    );

    let window = csv_source::window_from_bytes(&body)?;
    debug!("CSV predict request: {:?} ({} rows)", request, window.len());

    let report = run_blocking(move || state.pipeline.run(&window, &request)).await?;
    Ok(Json(report))
}
