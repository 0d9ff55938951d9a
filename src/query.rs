//! Monitoring query construction
//!
//! A query scopes one project, one metric-type filter, and one time window.
//! When no window is given the builder defaults to the last ten minutes,
//! matching the scrape interval so consecutive scheduled cycles tile time.

use crate::clock::BoundedClock;
use crate::{Error, Result};

use std::sync::Arc;

/// Width of the default query window, in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 600;

/// A time-series query against the monitoring service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    /// Project whose instances are being queried
    pub project_scope: String,
    /// Metric-type filter expression, passed to the service verbatim.
    /// Not validated here; a malformed filter surfaces when the query runs.
    pub metric_type_filter: String,
    /// Window start, epoch seconds
    pub start_time: i64,
    /// Window end, epoch seconds
    pub end_time: i64,
}

impl MetricQuery {
    /// Construct a query. The window must satisfy `start_time <= end_time`.
    pub fn new(
        project_scope: impl Into<String>,
        metric_type_filter: impl Into<String>,
        start_time: i64,
        end_time: i64,
    ) -> Result<Self> {
        if start_time > end_time {
            return Err(Error::InvalidWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            project_scope: project_scope.into(),
            metric_type_filter: metric_type_filter.into(),
            start_time,
            end_time,
        })
    }
}

/// Builds metric queries for one project scope.
#[derive(Clone)]
pub struct QueryBuilder {
    project_scope: String,
    clock: Arc<BoundedClock>,
}

impl QueryBuilder {
    pub fn new(project_scope: impl Into<String>, clock: Arc<BoundedClock>) -> Self {
        Self {
            project_scope: project_scope.into(),
            clock,
        }
    }

    pub fn project_scope(&self) -> &str {
        &self.project_scope
    }

    /// Build a query over the default window: `[now - 10 minutes, now]`.
    pub fn build(&self, metric_type_filter: &str) -> Result<MetricQuery> {
        self.build_with_window(metric_type_filter, None, None)
    }

    /// Build a query with explicit window bounds.
    ///
    /// Each bound falls back to its default independently: an absent start
    /// becomes `now - 10 minutes`, an absent end becomes `now`.
    pub fn build_with_window(
        &self,
        metric_type_filter: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<MetricQuery> {
        let now = self.clock.now_epoch_seconds();
        let start = start_time.unwrap_or(now - DEFAULT_WINDOW_SECS);
        let end = end_time.unwrap_or(now);
        MetricQuery::new(&self.project_scope, metric_type_filter, start, end)
    }

    /// Build a query for a different project than the builder's default.
    /// Used by the on-demand endpoint, where the caller names the project.
    pub fn build_for_project(
        &self,
        project_scope: &str,
        metric_type_filter: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<MetricQuery> {
        let now = self.clock.now_epoch_seconds();
        let start = start_time.unwrap_or(now - DEFAULT_WINDOW_SECS);
        let end = end_time.unwrap_or(now);
        MetricQuery::new(project_scope, metric_type_filter, start, end)
    }
}
