//! Monitoring service client
//!
//! The client executes a [`MetricQuery`](crate::query::MetricQuery) and
//! returns the matching time series. It is a pure read: no retry, no
//! pagination beyond what the service returns in one response, no caching.

mod http;

pub use http::{HttpMetricsClient, DEFAULT_BASE_URL};

use crate::query::MetricQuery;
use crate::{Error, Result};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One sample within a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// End of the sample interval, epoch seconds
    pub end_timestamp: i64,
    pub value: f64,
}

/// A stream of samples for one monitored instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// Identifier of the compute instance the samples belong to.
    /// Empty when the service omits the instance label.
    pub instance_label: String,
    pub points: Vec<Point>,
}

/// Monitoring client interface
///
/// This trait abstracts the monitoring backend, allowing the HTTP client to
/// be swapped for a canned one in tests and development.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Execute the query, returning every matching time series.
    async fn list_time_series(&self, query: &MetricQuery) -> Result<Vec<TimeSeries>>;
}

/// Fixed-response client for development and tests.
pub struct StaticMetricsClient {
    series: Vec<TimeSeries>,
    failure: Option<String>,
}

impl StaticMetricsClient {
    /// A client that answers every query with the given series.
    pub fn new(series: Vec<TimeSeries>) -> Self {
        Self {
            series,
            failure: None,
        }
    }

    /// A client that fails every query with a monitoring-API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            series: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl MetricsClient for StaticMetricsClient {
    async fn list_time_series(&self, _query: &MetricQuery) -> Result<Vec<TimeSeries>> {
        match &self.failure {
            Some(message) => Err(Error::MonitoringApi {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(self.series.clone()),
        }
    }
}
