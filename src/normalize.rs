//! Time-series normalization
//!
//! Flattens the nested series-of-points shape the monitoring service
//! returns into independent per-point records, the unit the document store
//! persists. Pure transformation: series order and point order are
//! preserved, and an empty input produces an empty output.

use crate::monitoring::TimeSeries;

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// One persisted sample. Create-only: records are never updated or deleted
/// once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub instance_name: String,
    /// ISO-8601 UTC datetime with millisecond precision
    pub datetime: String,
    pub value: f64,
}

/// Flatten time series into one record per (series, point) pair.
pub fn flatten_series(series: &[TimeSeries]) -> Vec<MetricRecord> {
    series
        .iter()
        .flat_map(|s| {
            s.points.iter().map(|point| MetricRecord {
                instance_name: s.instance_label.clone(),
                datetime: iso_datetime(point.end_timestamp),
                value: point.value,
            })
        })
        .collect()
}

/// Render epoch seconds as ISO-8601 UTC with millisecond precision.
fn iso_datetime(epoch_seconds: i64) -> String {
    DateTime::from_timestamp_millis(epoch_seconds.saturating_mul(1000))
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
