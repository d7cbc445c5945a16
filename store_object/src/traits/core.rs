//! Trait definitions
//!
//! This module defines the CRUD contract every document store fulfils.

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Entity;
use crate::backend::{DeleteOutcome, UpdateOutcome};
use crate::errors::StoreError;
use crate::id_type::EntityId;
use crate::query_builder::{Filter, UpdateSet};

/// Persistence operations for one collection of entities
///
/// Every call is a single server round trip; nothing is cached between calls.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// The entity type stored in the collection
    type Model: Entity;

    /// Insert an entity, assigning an identifier when it has none
    async fn insert(&self, entity: &Self::Model) -> Result<EntityId, StoreError>;

    /// First entity matching `filter`
    ///
    /// Which document wins among several matches is unspecified.
    async fn find_one(&self, filter: &Filter) -> Result<Self::Model, StoreError>;

    /// Entity with the given identifier
    async fn find_by_id(&self, id: &EntityId) -> Result<Self::Model, StoreError>;

    /// Entity with the given identifier in its hex form
    ///
    /// Malformed input fails with `InvalidIdentifier`, never `NotFound`.
    async fn find_by_id_str(&self, id: &str) -> Result<Self::Model, StoreError> {
        let id: EntityId = id.parse()?;
        self.find_by_id(&id).await
    }

    /// Every entity matching `filter`; no match is an empty Vec
    async fn find_many(&self, filter: &Filter) -> Result<Vec<Self::Model>, StoreError>;

    /// Every entity in the collection
    async fn find_all(&self) -> Result<Vec<Self::Model>, StoreError> {
        self.find_many(&Filter::new()).await
    }

    /// Apply `update` to the first entity matching `filter`; never upserts
    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateSet,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Delete the first entity matching `filter`
    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome, StoreError>;

    /// Number of entities matching `filter`
    async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;
}
