//! Tests for the fetch-and-store pipeline
//!
//! These tests run the real pipeline over fake clients and stores:
//! - record counts and stored document shape
//! - ordering guarantees of the flatten step
//! - failure isolation between metric kinds and between sibling writes
//! - fail-fast fetch vs. best-effort write asymmetry

use cloudpulse::clock::BoundedClock;
use cloudpulse::monitoring::{MetricsClient, Point, StaticMetricsClient, TimeSeries};
use cloudpulse::persist::Persister;
use cloudpulse::pipeline::{MetricKind, Pipeline};
use cloudpulse::query::{MetricQuery, QueryBuilder, DEFAULT_WINDOW_SECS};
use cloudpulse::store::{DocumentStore, InMemoryStore};
use cloudpulse::{Error, Result};

use async_trait::async_trait;
use bson::Document;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Helper: a series with the given instance label and (timestamp, value) points
fn series(label: &str, points: &[(i64, f64)]) -> TimeSeries {
    TimeSeries {
        instance_label: label.to_string(),
        points: points
            .iter()
            .map(|&(end_timestamp, value)| Point {
                end_timestamp,
                value,
            })
            .collect(),
    }
}

fn pipeline_over(
    client: Arc<dyn MetricsClient>,
    store: Arc<dyn DocumentStore>,
) -> Pipeline {
    let builder = QueryBuilder::new("test-project", Arc::new(BoundedClock::default()));
    Pipeline::new(client, Persister::new(store), builder)
}

/// Client that records every query it receives and answers with fixed series.
struct RecordingClient {
    queries: Mutex<Vec<MetricQuery>>,
    series: Vec<TimeSeries>,
}

impl RecordingClient {
    fn new(series: Vec<TimeSeries>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            series,
        }
    }
}

#[async_trait]
impl MetricsClient for RecordingClient {
    async fn list_time_series(&self, query: &MetricQuery) -> Result<Vec<TimeSeries>> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.series.clone())
    }
}

/// Client that fails queries carrying the utilization filter and answers
/// everything else.
struct UtilizationDownClient {
    series: Vec<TimeSeries>,
}

#[async_trait]
impl MetricsClient for UtilizationDownClient {
    async fn list_time_series(&self, query: &MetricQuery) -> Result<Vec<TimeSeries>> {
        if query.metric_type_filter.contains("cpu/utilization") {
            return Err(Error::MonitoringApi {
                status: 500,
                message: "utilization backend down".to_string(),
            });
        }
        Ok(self.series.clone())
    }
}

/// Store that rejects the Nth write overall, delegating the rest.
struct FailNth {
    inner: InMemoryStore,
    fail_index: usize,
    seen: AtomicUsize,
}

impl FailNth {
    fn new(fail_index: usize) -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_index,
            seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for FailNth {
    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let index = self.seen.fetch_add(1, Ordering::SeqCst);
        if index == self.fail_index {
            return Err(Error::Serialization("injected write failure".to_string()));
        }
        self.inner.insert(collection, document).await
    }
}

// =========================================================================
// Single-kind pipeline
// =========================================================================

#[tokio::test]
async fn test_collect_and_store_writes_one_document_per_point() {
    let client = Arc::new(StaticMetricsClient::new(vec![
        series("vm-1", &[(1000, 0.5), (1060, 0.7)]),
        series("vm-2", &[(1000, 0.9)]),
    ]));
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client, store.clone());

    let summary = pipeline
        .collect_and_store(MetricKind::CpuUtilization)
        .await
        .unwrap();

    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed, 0);

    let docs = store.documents("cpu_utilization_metric").await;
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].get_str("instanceName").unwrap(), "vm-1");
    assert_eq!(
        docs[0].get_str("datetime").unwrap(),
        "1970-01-01T00:16:40.000Z"
    );
    assert_eq!(docs[0].get_f64("value").unwrap(), 0.5);
    assert_eq!(
        docs[1].get_str("datetime").unwrap(),
        "1970-01-01T00:17:40.000Z"
    );
    assert_eq!(docs[2].get_str("instanceName").unwrap(), "vm-2");
}

#[tokio::test]
async fn test_empty_series_list_writes_nothing() {
    let client = Arc::new(StaticMetricsClient::new(Vec::new()));
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client, store.clone());

    let summary = pipeline
        .collect_and_store(MetricKind::CpuUtilization)
        .await
        .unwrap();

    assert_eq!(summary.total(), 0);
    assert!(store.is_empty("cpu_utilization_metric").await);
}

#[tokio::test]
async fn test_fetch_failure_propagates() {
    let client = Arc::new(StaticMetricsClient::failing("backend down"));
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client, store.clone());

    let err = pipeline
        .collect_and_store(MetricKind::CpuUtilization)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MonitoringApi { status: 503, .. }));
    assert!(store.is_empty("cpu_utilization_metric").await);
}

#[tokio::test]
async fn test_one_failed_write_of_n_leaves_the_rest_persisted() {
    let client = Arc::new(StaticMetricsClient::new(vec![series(
        "vm-1",
        &[(1000, 0.1), (1060, 0.2), (1120, 0.3), (1180, 0.4)],
    )]));
    let store = Arc::new(FailNth::new(2));
    let pipeline = pipeline_over(client, store.clone());

    let summary = pipeline
        .collect_and_store(MetricKind::CpuUtilization)
        .await
        .unwrap();

    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed, 1);

    let docs = store.inner.documents("cpu_utilization_metric").await;
    let values: Vec<f64> = docs.iter().map(|d| d.get_f64("value").unwrap()).collect();
    assert_eq!(values, [0.1, 0.2, 0.4]);
}

#[tokio::test]
async fn test_pipeline_queries_use_kind_filter_and_default_window() {
    let client = Arc::new(RecordingClient::new(Vec::new()));
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client.clone(), store);

    pipeline
        .collect_and_store(MetricKind::CpuUsageTime)
        .await
        .unwrap();

    let queries = client.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.project_scope, "test-project");
    assert_eq!(
        query.metric_type_filter,
        "metric.type=\"compute.googleapis.com/instance/cpu/usage_time\""
    );
    assert_eq!(query.end_time - query.start_time, DEFAULT_WINDOW_SECS);
}

// =========================================================================
// Per-kind independence
// =========================================================================

#[tokio::test]
async fn test_run_once_collects_every_kind_into_its_own_collection() {
    let client = Arc::new(StaticMetricsClient::new(vec![series(
        "vm-1",
        &[(1000, 0.5)],
    )]));
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client, store.clone());

    let report = pipeline.run_once().await;

    assert!(report.failed_kinds().is_empty());
    for kind in MetricKind::ALL {
        assert_eq!(store.len(kind.collection()).await, 1, "{}", kind.as_str());
    }
}

#[tokio::test]
async fn test_one_kind_failing_does_not_block_the_other() {
    let client = Arc::new(UtilizationDownClient {
        series: vec![series("vm-1", &[(1000, 12.5)])],
    });
    let store = Arc::new(InMemoryStore::new());
    let pipeline = pipeline_over(client, store.clone());

    let report = pipeline.run_once().await;

    assert_eq!(report.failed_kinds(), vec![MetricKind::CpuUtilization]);
    assert!(store.is_empty("cpu_utilization_metric").await);
    assert_eq!(store.len("cpu_usage_time_metric").await, 1);

    let usage_outcome = report
        .outcomes
        .iter()
        .find(|(kind, _)| *kind == MetricKind::CpuUsageTime)
        .map(|(_, outcome)| outcome.as_ref().unwrap())
        .unwrap();
    assert_eq!(usage_outcome.written, 1);
}
