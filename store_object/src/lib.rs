//! Store Object - Core document access layer for DocHaus
//!
//! This crate provides the foundational types and traits for document
//! operations: the entity and store traits, the generic repository, typed
//! filters and updates, and the storage backends behind them.

pub mod backend;
pub mod errors;
pub mod generic_store;
pub mod id_type;
pub mod prelude;
pub mod query_builder;
pub mod traits;
pub mod validation;

pub use backend::{
    DatabaseHandle, DeleteOutcome, DocumentCollection, MemoryDatabase, MongoDatabase,
    UpdateOutcome,
};
pub use errors::StoreError;
pub use generic_store::Repository;
pub use id_type::EntityId;
pub use query_builder::{Filter, FilterOperator, UpdateSet};
pub use traits::*;
pub use validation::{ValidatedCollectionName, ValidatedFieldName, ValidationError};

pub use mongodb::bson;

/// Result of a single store operation
pub type OperationResult<T> = Result<T, StoreError>;
