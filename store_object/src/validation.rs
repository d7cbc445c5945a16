//! Validation module
//!
//! Name checks for collections and document fields, applied before anything
//! reaches the server.

use std::fmt;

/// Validation errors for collection and field names
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is empty
    Empty,
    /// Name is too long
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name contains a character the server refuses (`$` or NUL)
    InvalidCharacters(String),
    /// Name starts with a prefix reserved by the server
    ReservedPrefix { name: String, prefix: String },
    /// Dotted path with an empty segment (`a..b`, `.a`, `a.`)
    EmptySegment(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Name cannot be empty"),
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} bytes (max {})",
                    name, length, max_length
                )
            }
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': '$' and NUL are not allowed", name)
            }
            ValidationError::ReservedPrefix { name, prefix } => {
                write!(f, "Name '{}' uses the reserved prefix '{}'", name, prefix)
            }
            ValidationError::EmptySegment(name) => {
                write!(f, "Field path '{}' contains an empty segment", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated collection name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedCollectionName(String);

impl ValidatedCollectionName {
    /// Namespace (`db.collection`) is capped at 255 bytes; keep room for the db part
    const MAX_LENGTH: usize = 120;

    /// Create a new validated collection name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty);
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }
        if name.contains(['$', '\0']) {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }
        if name.starts_with("system.") {
            return Err(ValidationError::ReservedPrefix {
                name: name.to_string(),
                prefix: "system.".to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated field name or dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    /// Create a new validated field name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty);
        }
        if name.contains('\0') {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }
        if name.split('.').any(str::is_empty) {
            return Err(ValidationError::EmptySegment(name.to_string()));
        }
        if name.split('.').any(|segment| segment.starts_with('$')) {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
