//! Component factory for environment-based configuration
//!
//! This module provides factory methods to create the document store and
//! monitoring client based on environment variables, enabling easy
//! switching between development and production configurations.

use crate::monitoring::{self, HttpMetricsClient, MetricsClient};
use crate::store::{DocumentStore, InMemoryStore, MongoStore};
use crate::Result;

use std::sync::Arc;
use tracing::info;

/// Fallback project scope when the environment does not name one.
pub const PROJECT_SCOPE_PLACEHOLDER: &str = "YOUR_PROJECT_ID";

pub struct ComponentFactory;

impl ComponentFactory {
    /// Resolve the project scope from the process environment.
    ///
    /// Environment variables:
    /// - GCLOUD_PROJECT: project identifier, with a literal placeholder
    ///   fallback if absent
    pub fn project_scope() -> String {
        std::env::var("GCLOUD_PROJECT")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| PROJECT_SCOPE_PLACEHOLDER.to_string())
    }

    /// Create document store from environment
    ///
    /// Environment variables:
    /// - STORE_BACKEND: "memory" (default) or "mongodb"
    /// - MONGODB_URI: connection string (required for mongodb)
    /// - MONGODB_DATABASE: database name (default: cloudpulse)
    pub async fn create_document_store() -> Result<Arc<dyn DocumentStore>> {
        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());

        match backend.as_str() {
            "memory" => {
                info!("Using in-memory document store (development mode)");
                Ok(Arc::new(InMemoryStore::new()))
            }
            "mongodb" => {
                let uri = std::env::var("MONGODB_URI").map_err(|_| {
                    crate::Error::Config(
                        "MONGODB_URI required when STORE_BACKEND=mongodb".to_string(),
                    )
                })?;
                let database =
                    std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "cloudpulse".to_string());

                info!(database = %database, "Using MongoDB document store");

                Ok(Arc::new(MongoStore::connect(&uri, &database).await?))
            }
            _ => Err(crate::Error::Config(format!(
                "Unknown STORE_BACKEND: {}. Use 'memory' or 'mongodb'",
                backend
            ))),
        }
    }

    /// Create monitoring client from environment
    ///
    /// Environment variables:
    /// - MONITORING_BASE_URL: service endpoint override (default: the
    ///   production monitoring endpoint)
    /// - MONITORING_TOKEN: bearer token (optional; unauthenticated requests
    ///   surface as auth errors when the query executes)
    pub fn create_metrics_client() -> Result<Arc<dyn MetricsClient>> {
        let base_url = std::env::var("MONITORING_BASE_URL")
            .unwrap_or_else(|_| monitoring::DEFAULT_BASE_URL.to_string());
        let token = std::env::var("MONITORING_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        info!(base_url = %base_url, "Using HTTP monitoring client");

        Ok(Arc::new(HttpMetricsClient::new(base_url, token)?))
    }
}
