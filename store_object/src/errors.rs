use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("Not found in '{collection}': {filter}")]
    NotFound { collection: String, filter: String },

    #[error("Write to '{collection}' rejected: {message}")]
    Write { collection: String, message: String },

    #[error("Read from '{collection}' failed: {message}")]
    Read { collection: String, message: String },

    #[error("Cannot decode document from '{collection}': {message}")]
    Decode { collection: String, message: String },

    #[error("Cannot encode entity for '{collection}': {message}")]
    Encode { collection: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion handle for operation #{operation} was already awaited")]
    DoubleAwait { operation: u64 },

    #[error("Operation #{operation} ended without delivering a result")]
    OperationAborted { operation: u64 },
}

impl StoreError {
    pub fn write(collection: &str, message: impl ToString) -> Self {
        Self::Write {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn read(collection: &str, message: impl ToString) -> Self {
        Self::Read {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn decode(collection: &str, message: impl ToString) -> Self {
        Self::Decode {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn encode(collection: &str, message: impl ToString) -> Self {
        Self::Encode {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(collection: &str, filter: impl ToString) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            filter: filter.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
