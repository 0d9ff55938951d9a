//! Collection pipelines
//!
//! One pipeline invocation for one metric kind: Query Builder → Metrics
//! Client → Normalizer → Persister, sequentially. Kinds run concurrently
//! with each other — they touch disjoint collections and share no mutable
//! state — and a failure in one kind's pipeline never blocks another's.
//!
//! Fetch failures propagate and fail that kind's invocation for the cycle;
//! write failures are absorbed record-by-record inside the persister.

use crate::monitoring::MetricsClient;
use crate::normalize::flatten_series;
use crate::persist::{Persister, WriteSummary};
use crate::query::QueryBuilder;
use crate::Result;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Interval between scheduled collection cycles.
pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(600);

/// A tracked metric kind: its filter and its target collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    CpuUtilization,
    CpuUsageTime,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::CpuUtilization, MetricKind::CpuUsageTime];

    /// Filter expression selecting this kind's time series.
    pub fn metric_type_filter(&self) -> &'static str {
        match self {
            Self::CpuUtilization => {
                "metric.type=\"compute.googleapis.com/instance/cpu/utilization\""
            }
            Self::CpuUsageTime => {
                "metric.type=\"compute.googleapis.com/instance/cpu/usage_time\""
            }
        }
    }

    /// Collection this kind's records are appended to.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::CpuUtilization => "cpu_utilization_metric",
            Self::CpuUsageTime => "cpu_usage_time_metric",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CpuUtilization => "cpu_utilization",
            Self::CpuUsageTime => "cpu_usage_time",
        }
    }
}

/// Outcome of one scheduled cycle, one entry per metric kind.
///
/// Keeping each kind's `Result` makes a partial failure observable without
/// the failing kind taking its sibling down.
#[derive(Debug)]
pub struct CycleReport {
    pub outcomes: Vec<(MetricKind, Result<WriteSummary>)>,
}

impl CycleReport {
    pub fn failed_kinds(&self) -> Vec<MetricKind> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(kind, _)| *kind)
            .collect()
    }
}

/// Fetch-and-store pipeline over injected handles.
///
/// Handles are constructed once at process start and passed in, so tests
/// run the same pipeline against fake clients and stores.
pub struct Pipeline {
    client: Arc<dyn MetricsClient>,
    persister: Persister,
    query_builder: QueryBuilder,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn MetricsClient>,
        persister: Persister,
        query_builder: QueryBuilder,
    ) -> Self {
        Self {
            client,
            persister,
            query_builder,
        }
    }

    /// Run one kind's pipeline: fetch, flatten, persist.
    pub async fn collect_and_store(&self, kind: MetricKind) -> Result<WriteSummary> {
        let query = self.query_builder.build(kind.metric_type_filter())?;
        let series = self.client.list_time_series(&query).await?;
        let records = flatten_series(&series);
        let summary = self.persister.persist(kind.collection(), &records).await;

        info!(
            kind = kind.as_str(),
            series = series.len(),
            written = summary.written,
            failed = summary.failed,
            "Metric kind collected"
        );

        Ok(summary)
    }

    /// Run every tracked kind concurrently, capturing each outcome.
    pub async fn run_once(&self) -> CycleReport {
        let (utilization, usage_time) = tokio::join!(
            self.collect_and_store(MetricKind::CpuUtilization),
            self.collect_and_store(MetricKind::CpuUsageTime),
        );

        let outcomes = vec![
            (MetricKind::CpuUtilization, utilization),
            (MetricKind::CpuUsageTime, usage_time),
        ];
        for (kind, outcome) in &outcomes {
            if let Err(e) = outcome {
                error!(kind = kind.as_str(), error = %e, "Metric kind collection failed");
            }
        }

        CycleReport { outcomes }
    }

    /// Scheduled loop. Runs a cycle per interval tick (including one
    /// immediately on start) until the shutdown token is cancelled.
    /// A failed cycle never stops the loop.
    pub async fn run(&self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Collection scheduler shutting down");
                    break;
                }
            }
        }
    }
}
