//! Record persistence
//!
//! Writes are issued one record at a time, in order. A failed write is
//! logged and skipped; siblings still land. This is policy, not an
//! accident: reads fail fast, writes are best-effort.

use crate::normalize::MetricRecord;
use crate::store::DocumentStore;
use crate::Result;

use std::sync::Arc;
use tracing::error;

/// Outcome of one persistence batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub written: usize,
    pub failed: usize,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.written + self.failed
    }
}

/// Appends normalized records to the document store.
pub struct Persister {
    store: Arc<dyn DocumentStore>,
}

impl Persister {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write each record into `collection` as a new document.
    ///
    /// Per-record failures are caught, logged, and counted; they never
    /// abort the batch or roll back sibling writes.
    pub async fn persist(&self, collection: &str, records: &[MetricRecord]) -> WriteSummary {
        let mut summary = WriteSummary::default();

        for record in records {
            match self.write_record(collection, record).await {
                Ok(()) => summary.written += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        collection,
                        instance = %record.instance_name,
                        error = %e,
                        "Failed to persist metric record"
                    );
                }
            }
        }

        summary
    }

    async fn write_record(&self, collection: &str, record: &MetricRecord) -> Result<()> {
        let document = bson::to_document(record)?;
        self.store.insert(collection, document).await
    }
}
