//! Telemetry Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry::SampleRow;
use tracing::debug;

use crate::error::{required, ApiResult};
use crate::SharedState;

/// One sample posted by the OBD-II collector
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub motorcycle_id: Option<String>,
    /// Defaults to the time of arrival
    pub timestamp: Option<DateTime<Utc>>,
    pub rpm: Option<f64>,
    pub engine_load: Option<f64>,
    pub throttle_pos: Option<f64>,
    pub long_fuel_trim_1: Option<f64>,
    pub coolant_temp: Option<f64>,
    pub elm_voltage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: String,
    pub motorcycle_id: String,
    pub rows_stored: usize,
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub motorcycle_id: Option<String>,
}

/// Store one sample
pub async fn ingest(
    State(state): State<SharedState>,
    Json(body): Json<IngestBody>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let motorcycle_id = required(body.motorcycle_id, "motorcycle_id")?;

    let row = SampleRow {
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
        rpm: body.rpm,
        engine_load: body.engine_load,
        throttle_pos: body.throttle_pos,
        long_fuel_trim_1: body.long_fuel_trim_1,
        coolant_temp: body.coolant_temp,
        elm_voltage: body.elm_voltage,
    };
    debug!("Ingest for {}: {} channels", motorcycle_id, row.present_count());

    state.repository.insert(&motorcycle_id, row)?;
    metrics::counter!("telemetry_rows_ingested_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "stored".to_string(),
            rows_stored: state.repository.count(&motorcycle_id),
            motorcycle_id,
        }),
    ))
}

/// Most recent sample for a motorcycle
pub async fn latest(
    State(state): State<SharedState>,
    Query(params): Query<LatestQuery>,
) -> ApiResult<Json<SampleRow>> {
    let motorcycle_id = required(params.motorcycle_id, "motorcycle_id")?;
    Ok(Json(state.repository.latest(&motorcycle_id)?))
}
