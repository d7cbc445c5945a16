//! MongoDB driver backend

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection, Database};
use std::sync::Arc;

use super::{DatabaseHandle, DeleteOutcome, DocumentCollection, UpdateOutcome};
use crate::errors::StoreError;
use crate::validation::ValidatedCollectionName;

/// Connected MongoDB database
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    database: Database,
}

impl MongoDatabase {
    pub fn new(client: Client, database_name: &str) -> Self {
        let database = client.database(database_name);
        Self { client, database }
    }

    /// Underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DatabaseHandle for MongoDatabase {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    fn collection(&self, name: &ValidatedCollectionName) -> Arc<dyn DocumentCollection> {
        Arc::new(MongoCollection::new(
            self.database.collection::<Document>(name.as_str()),
        ))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}

/// Driver collection over raw documents
#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
    name: String,
}

impl MongoCollection {
    pub fn new(inner: Collection<Document>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }

    fn write_error(&self, err: MongoError) -> StoreError {
        classify(err, &self.name, |collection, message| {
            StoreError::write(collection, message)
        })
    }

    fn read_error(&self, err: MongoError) -> StoreError {
        classify(err, &self.name, |collection, message| {
            StoreError::read(collection, message)
        })
    }
}

/// Connectivity failures become `Connection`; everything else goes to `fallback`
fn classify(
    err: MongoError,
    collection: &str,
    fallback: fn(&str, String) -> StoreError,
) -> StoreError {
    match *err.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        _ => fallback(collection, err.to_string()),
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError> {
        self.inner
            .insert_one(document)
            .await
            .map(|result| result.inserted_id)
            .map_err(|e| self.write_error(e))
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| self.read_error(e))
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| self.read_error(e))?;
        cursor.try_collect().await.map_err(|e| self.read_error(e))
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .inner
            .update_one(filter, update)
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, StoreError> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn count(&self, filter: Document) -> Result<u64, StoreError> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| self.read_error(e))
    }
}
