//! MongoDB document store

use super::DocumentStore;
use crate::Result;

use async_trait::async_trait;
use bson::Document;
use mongodb::{Client, Database};

/// Document store backed by one MongoDB database; each metric kind's
/// records land in their own collection within it.
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to a MongoDB deployment and select the given database.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            database: client.database(database),
        })
    }

    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        self.database
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await?;
        Ok(())
    }
}
