//! Period Report Routes

use axum::{
    extract::{Query, State},
    Json,
};
use diagnosis::summary::{channel_means, ChannelMeans, Period};
use serde::Deserialize;

use crate::error::{required, ApiResult};
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub motorcycle_id: Option<String>,
}

fn summarize(
    state: &SharedState,
    params: ReportQuery,
    period: Period,
) -> ApiResult<Json<ChannelMeans>> {
    let motorcycle_id = required(params.motorcycle_id, "motorcycle_id")?;
    Ok(Json(channel_means(&state.repository, &motorcycle_id, period)?))
}

/// Channel means over the last 24 hours
pub async fn daily(
    State(state): State<SharedState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<Json<ChannelMeans>> {
    summarize(&state, params, Period::Daily)
}

/// Channel means over the last 7 days
pub async fn weekly(
    State(state): State<SharedState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<Json<ChannelMeans>> {
    summarize(&state, params, Period::Weekly)
}
