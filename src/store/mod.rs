//! Document store
//!
//! The persisted unit is a BSON document appended to a named collection.
//! The interface is create-only: no reads, updates, or deletes — records
//! are retained permanently in their collection.

mod memory;
mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

use crate::Result;

use async_trait::async_trait;
use bson::Document;

/// Document store interface
///
/// This trait abstracts the storage backend, allowing for different
/// implementations (in-memory for dev/tests, MongoDB for prod).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a new document to the named collection.
    async fn insert(&self, collection: &str, document: Document) -> Result<()>;
}
