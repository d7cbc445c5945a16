//! # DocHaus
//!
//! A small document-database access library for MongoDB: one lazily
//! initialized connection shared by the whole process, generic repositories
//! over named collections, and concurrent operations joined through
//! completion handles.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dochaus::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Person {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<EntityId>,
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! impl Entity for Person {
//!     fn id(&self) -> Option<EntityId> {
//!         self.id
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ConnectionProvider::new(DatabaseConfig::new("dochaus".to_string()));
//!     let connection = provider.get_connection().await?;
//!     let people = connection.repository::<Person>("people")?;
//!
//!     let id = people
//!         .insert(&Person { id: None, name: "Alice".to_string(), age: 30 })
//!         .await?;
//!     let alice = people.find_by_id(&id).await?;
//!     println!("Found {}", alice.name);
//!
//!     provider.disconnect().await;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod connector;
pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use connector::{Connector, MemoryConnector, MongoConnector};
pub use core::{ConnectionHandle, ConnectionProvider};
pub use errors::ConnectionError;

// Re-export centralized config
pub use config::{AppConfig, ConnectionSettings, DatabaseConfig};

// Re-export internal crates used by the public API
pub use operation_runner;
pub use store_object;

// Re-export external dependencies used in public API
pub use async_trait;
pub use mongodb;
