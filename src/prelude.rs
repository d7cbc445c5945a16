//! Convenience re-exports for common DocHaus usage
//!
//! # Example
//!
//! ```rust
//! use dochaus::prelude::*;
//! ```

// Connection management
pub use crate::connector::{Connector, MemoryConnector, MongoConnector};
pub use crate::core::{ConnectionHandle, ConnectionProvider};
pub use crate::errors::ConnectionError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Entities, repositories, filters and updates
pub use store_object::prelude::*;

// Concurrent operations
pub use operation_runner::{wait_all, CompletionHandle, OperationRunner};

// Common external dependencies
pub use tokio;
