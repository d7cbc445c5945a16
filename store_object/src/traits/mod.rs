//! Traits for database operations
//!
//! This module contains the traits that define the interface for entities and
//! the stores that persist them.

pub mod core;
pub mod entity;

// Re-export all public items for convenience
pub use core::DocumentStore;
pub use entity::Entity;
