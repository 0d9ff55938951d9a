//! On-demand metric query endpoints

use crate::api::ApiState;
use crate::monitoring::TimeSeries;
use crate::pipeline::MetricKind;
use crate::Error;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

/// Query parameters for on-demand metric fetches.
///
/// Bounds arrive as raw text so that non-numeric input degrades to the
/// default window instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct FetchParams {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
}

/// Fetch CPU utilization time series
///
/// GET /api/v1/metrics/cpu-utilization
///
/// Returns the raw series list from the monitoring service. `startTime`
/// and `endTime` are epoch seconds; each bound independently falls back
/// to the default last-ten-minutes window when absent or non-numeric.
pub async fn cpu_utilization(
    State(state): State<ApiState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<Vec<TimeSeries>>, (StatusCode, String)> {
    let project = params
        .project_id
        .as_deref()
        .unwrap_or_else(|| state.query_builder.project_scope());
    let start = parse_epoch_seconds(params.start_time.as_deref());
    let end = parse_epoch_seconds(params.end_time.as_deref());

    let query = state
        .query_builder
        .build_for_project(
            project,
            MetricKind::CpuUtilization.metric_type_filter(),
            start,
            end,
        )
        .map_err(error_response)?;

    let series = state
        .client
        .list_time_series(&query)
        .await
        .map_err(error_response)?;

    Ok(Json(series))
}

/// RAM usage sibling endpoint — placeholder with no behavior.
pub async fn ram_usage() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

/// Uptime sibling endpoint — placeholder with no behavior.
pub async fn uptime() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

fn parse_epoch_seconds(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

fn error_response(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::Auth(_) => StatusCode::UNAUTHORIZED,
        Error::InvalidWindow { .. } => StatusCode::BAD_REQUEST,
        Error::Transport(_) | Error::MonitoringApi { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
