//! Storage backends
//!
//! The repository talks to the server through [`DocumentCollection`]; a
//! connected database is exposed as a [`DatabaseHandle`]. Two backends are
//! provided: the MongoDB driver and an in-process store.

pub mod evaluate;
pub mod memory;
pub mod mongo;


use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::validation::ValidatedCollectionName;

pub use memory::{MemoryCollection, MemoryDatabase};
pub use mongo::{MongoCollection, MongoDatabase};

/// Outcome of an update against a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Outcome of a single-document delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// One server round trip per call, over raw documents
#[async_trait]
pub trait DocumentCollection: Send + Sync + Debug {
    /// Collection name
    fn name(&self) -> &str;

    /// Insert a document, returning the stored `_id`
    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError>;

    /// First document matching `filter`, in server order
    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError>;

    /// All documents matching `filter`
    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError>;

    /// Apply `update` to the first document matching `filter`; never upserts
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Delete the first document matching `filter`
    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, StoreError>;

    /// Number of documents matching `filter`
    async fn count(&self, filter: Document) -> Result<u64, StoreError>;
}

/// A live database connection shared by every repository built on it
#[async_trait]
pub trait DatabaseHandle: Send + Sync + Debug {
    fn database_name(&self) -> &str;

    /// Collection accessor; does not touch the server
    fn collection(&self, name: &ValidatedCollectionName) -> Arc<dyn DocumentCollection>;

    /// Round trip to check the server answers
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the underlying connection
    async fn shutdown(&self);
}
