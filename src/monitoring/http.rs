//! HTTP monitoring client
//!
//! Talks to the monitoring service's REST surface
//! (`GET /v3/projects/{project}/timeSeries`). Interval bounds go out as
//! RFC 3339; sample intervals come back the same way and are converted to
//! epoch seconds at the edge.

use super::{MetricsClient, Point, TimeSeries};
use crate::query::MetricQuery;
use crate::{Error, Result};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Production monitoring endpoint.
pub const DEFAULT_BASE_URL: &str = "https://monitoring.googleapis.com";

/// Label carrying the instance name on compute metrics.
const INSTANCE_NAME_LABEL: &str = "instance_name";

/// Monitoring client backed by the service's REST API.
pub struct HttpMetricsClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpMetricsClient {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::Transport)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            bearer_token,
        })
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn list_time_series(&self, query: &MetricQuery) -> Result<Vec<TimeSeries>> {
        let url = format!(
            "{}/v3/projects/{}/timeSeries",
            self.base_url, query.project_scope
        );

        let start = to_rfc3339(query.start_time)?;
        let end = to_rfc3339(query.end_time)?;
        let mut request = self.http.get(&url).query(&[
            ("filter", query.metric_type_filter.as_str()),
            ("interval.startTime", start.as_str()),
            ("interval.endTime", end.as_str()),
        ]);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Auth(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::MonitoringApi {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListTimeSeriesResponse = response.json().await?;
        body.time_series.into_iter().map(into_series).collect()
    }
}

fn to_rfc3339(epoch_seconds: i64) -> Result<String> {
    let ts = DateTime::from_timestamp(epoch_seconds, 0).ok_or_else(|| {
        Error::Serialization(format!("timestamp {} out of range", epoch_seconds))
    })?;
    Ok(ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn into_series(wire: WireTimeSeries) -> Result<TimeSeries> {
    let instance_label = wire
        .metric
        .labels
        .get(INSTANCE_NAME_LABEL)
        .cloned()
        .unwrap_or_default();

    let points = wire
        .points
        .into_iter()
        .map(|point| {
            let end = DateTime::parse_from_rfc3339(&point.interval.end_time)
                .map_err(|e| {
                    Error::Serialization(format!(
                        "bad interval end time '{}': {}",
                        point.interval.end_time, e
                    ))
                })?
                .timestamp();
            Ok(Point {
                end_timestamp: end,
                value: point.value.double_value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TimeSeries {
        instance_label,
        points,
    })
}

// Wire shapes, as the REST API returns them.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimeSeriesResponse {
    #[serde(default)]
    time_series: Vec<WireTimeSeries>,
}

#[derive(Debug, Deserialize)]
struct WireTimeSeries {
    #[serde(default)]
    metric: WireMetric,
    #[serde(default)]
    points: Vec<WirePoint>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetric {
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    interval: WireInterval,
    #[serde(default)]
    value: WireValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInterval {
    end_time: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireValue {
    #[serde(default)]
    double_value: f64,
}
