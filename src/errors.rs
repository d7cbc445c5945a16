//! Error types for the DocHaus crate
//!
//! Connection errors are cloneable: a failed initialization is recorded once
//! and handed to every caller of the provider.

use config::ConfigError;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Invalid connection URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[error("Database connection error: {0}")]
    Connect(String),

    #[error("Connection provider has been closed")]
    Closed,
}

impl From<ConfigError> for ConnectionError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidUri { uri, reason } => Self::InvalidUri { uri, reason },
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<ConnectionError> for StoreError {
    fn from(err: ConnectionError) -> Self {
        StoreError::Connection(err.to_string())
    }
}
