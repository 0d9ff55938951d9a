//! On-demand HTTP API
//!
//! Exposes the scheduled path's metric queries for ad-hoc inspection. The
//! handlers run Query Builder + Metrics Client only and return the raw
//! time-series list — nothing is normalized or persisted here.

pub mod metrics;

use crate::monitoring::MetricsClient;
use crate::query::QueryBuilder;

use axum::Router;
use std::sync::Arc;

/// Build the HTTP API router
pub fn build_http_router(state: ApiState) -> Router {
    use axum::routing::get;
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))

        // On-demand metric queries
        .route("/api/v1/metrics/cpu-utilization", get(metrics::cpu_utilization))

        // Placeholders, not implemented
        .route("/api/v1/metrics/ram-usage", get(metrics::ram_usage))
        .route("/api/v1/metrics/uptime", get(metrics::uptime))

        .with_state(state)
        .layer(cors)
}

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub client: Arc<dyn MetricsClient>,
    pub query_builder: QueryBuilder,
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn ready_check() -> &'static str {
    "READY"
}
