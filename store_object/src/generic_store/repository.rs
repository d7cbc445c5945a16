//! Generic repository implementation
//!
//! Translates typed entities, filters and updates into single document
//! round trips against the backing collection.

use super::core::Repository;
use crate::backend::{DeleteOutcome, UpdateOutcome};
use crate::errors::StoreError;
use crate::id_type::EntityId;
use crate::query_builder::{Filter, UpdateSet};
use crate::traits::{DocumentStore, Entity};
use async_trait::async_trait;

#[async_trait]
impl<T> DocumentStore for Repository<T>
where
    T: Entity,
{
    type Model = T;

    async fn insert(&self, entity: &Self::Model) -> Result<EntityId, StoreError> {
        let mut document = self.encode(entity)?;
        let id = entity.id().unwrap_or_default();
        document.insert("_id", id.to_bson());

        let stored = self.collection.insert_one(document).await?;
        let stored = EntityId::try_from(stored)?;

        tracing::debug!("[INSERT] Collection: {} id: {}", self.collection_name(), stored);
        Ok(stored)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Self::Model, StoreError> {
        let document = self
            .collection
            .find_one(filter.to_document()?)
            .await?
            .ok_or_else(|| StoreError::not_found(self.collection_name(), filter))?;

        tracing::debug!("[FIND_ONE] Collection: {} filter: {}", self.collection_name(), filter);
        self.decode(document)
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Self::Model, StoreError> {
        self.find_one(&Filter::by_id(id)).await
    }

    async fn find_many(&self, filter: &Filter) -> Result<Vec<Self::Model>, StoreError> {
        let documents = self.collection.find(filter.to_document()?).await?;

        tracing::debug!(
            "[FIND_MANY] Collection: {} filter: {} matched: {}",
            self.collection_name(),
            filter,
            documents.len()
        );
        documents
            .into_iter()
            .map(|document| self.decode(document))
            .collect()
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateSet,
    ) -> Result<UpdateOutcome, StoreError> {
        let outcome = self
            .collection
            .update_one(filter.to_document()?, update.to_document()?)
            .await?;

        tracing::debug!(
            "[UPDATE_ONE] Collection: {} matched: {} modified: {}",
            self.collection_name(),
            outcome.matched_count,
            outcome.modified_count
        );
        Ok(outcome)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome, StoreError> {
        let outcome = self.collection.delete_one(filter.to_document()?).await?;

        tracing::debug!(
            "[DELETE_ONE] Collection: {} deleted: {}",
            self.collection_name(),
            outcome.deleted_count
        );
        Ok(outcome)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.collection.count(filter.to_document()?).await
    }
}
