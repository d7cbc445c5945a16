//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{DocumentStore, Entity};

// Error types
pub use crate::errors::StoreError;
pub use crate::OperationResult;

// Core store functionality
pub use crate::generic_store::Repository;
pub use crate::backend::{DatabaseHandle, DeleteOutcome, UpdateOutcome};

// ID type
pub use crate::id_type::EntityId;

// Validation
pub use crate::validation::{ValidatedCollectionName, ValidatedFieldName, ValidationError};

// Query building
pub use crate::query_builder::{Filter, FilterOperator, UpdateSet};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use mongodb::bson::{doc, Bson, Document};
pub use serde::{Deserialize, Serialize};
