//! In-process backend
//!
//! Keeps documents in insertion order behind an async lock. Each call takes
//! the lock once, which stands in for one server round trip.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use super::evaluate::{apply_update, matches, values_equal};
use super::{DatabaseHandle, DeleteOutcome, DocumentCollection, UpdateOutcome};
use crate::errors::StoreError;
use crate::validation::ValidatedCollectionName;

/// In-process database; clones share the same collections
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    name: String,
    collections: Arc<Mutex<HashMap<String, Arc<MemoryCollection>>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryDatabase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Arc::new(Mutex::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Concrete collection, created on first use
    pub fn memory_collection(&self, name: &str) -> Arc<MemoryCollection> {
        let mut collections = match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryCollection::new(name.to_string(), self.closed.clone()))
            })
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl DatabaseHandle for MemoryDatabase {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn collection(&self, name: &ValidatedCollectionName) -> Arc<dyn DocumentCollection> {
        self.memory_collection(name.as_str())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Connection("database has been shut down".to_string()));
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// In-process collection
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
    round_trips: AtomicU64,
    closed: Arc<AtomicBool>,
}

impl MemoryCollection {
    fn new(name: String, closed: Arc<AtomicBool>) -> Self {
        Self {
            name,
            documents: RwLock::new(Vec::new()),
            round_trips: AtomicU64::new(0),
            closed,
        }
    }

    /// Number of calls served so far
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Copy of the stored documents, in insertion order
    pub async fn snapshot(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    fn begin(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Connection(
                "database has been shut down".to_string(),
            ));
        }
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut document: Document) -> Result<Bson, StoreError> {
        self.begin()?;
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        let mut documents = self.documents.write().await;
        let duplicate = documents
            .iter()
            .any(|existing| existing.get("_id").is_some_and(|other| values_equal(other, &id)));
        if duplicate {
            return Err(StoreError::write(
                &self.name,
                format!("E11000 duplicate key error: _id {}", id),
            ));
        }
        documents.push(document);
        Ok(id)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        self.begin()?;
        let documents = self.documents.read().await;
        for document in documents.iter() {
            if matches(document, &filter)? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        self.begin()?;
        let documents = self.documents.read().await;
        let mut found = Vec::new();
        for document in documents.iter() {
            if matches(document, &filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.begin()?;
        let mut documents = self.documents.write().await;
        for document in documents.iter_mut() {
            if matches(document, &filter)? {
                let modified = apply_update(document, &update, &self.name)?;
                return Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                });
            }
        }
        Ok(UpdateOutcome::default())
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, StoreError> {
        self.begin()?;
        let mut documents = self.documents.write().await;
        let mut position = None;
        for (index, document) in documents.iter().enumerate() {
            if matches(document, &filter)? {
                position = Some(index);
                break;
            }
        }
        let deleted_count = match position {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteOutcome { deleted_count })
    }

    async fn count(&self, filter: Document) -> Result<u64, StoreError> {
        self.begin()?;
        let documents = self.documents.read().await;
        let mut total = 0;
        for document in documents.iter() {
            if matches(document, &filter)? {
                total += 1;
            }
        }
        Ok(total)
    }
}
