use mongodb::bson::{self, Document};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::backend::{DatabaseHandle, DocumentCollection};
use crate::errors::StoreError;
use crate::traits::Entity;
use crate::validation::ValidatedCollectionName;

/// Repository bound to one named collection of `T`
pub struct Repository<T: Entity> {
    pub(crate) collection: Arc<dyn DocumentCollection>,
    pub(crate) _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection.name())
            .field("entity", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Entity> Repository<T> {
    /// Bind a repository to `collection` on a connected database
    pub fn new(handle: &dyn DatabaseHandle, collection: &str) -> Result<Self, StoreError> {
        let name = ValidatedCollectionName::new(collection)?;
        Ok(Self::from_collection(handle.collection(&name)))
    }

    /// Wrap an already resolved collection
    pub fn from_collection(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            _phantom: PhantomData,
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub(crate) fn encode(&self, entity: &T) -> Result<Document, StoreError> {
        bson::to_document(entity).map_err(|e| StoreError::encode(self.collection_name(), e))
    }

    pub(crate) fn decode(&self, document: Document) -> Result<T, StoreError> {
        bson::from_document(document).map_err(|e| StoreError::decode(self.collection_name(), e))
    }
}
