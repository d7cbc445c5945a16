//! Id Type module
//!
//! Typed entity identifiers backed by MongoDB ObjectIds.

use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::StoreError;

/// Opaque identifier of a stored entity
///
/// Serializes exactly like the ObjectId it wraps, so it can sit directly in an
/// entity's `_id` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(ObjectId);

impl EntityId {
    /// Generate a fresh client-side identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn to_bson(&self) -> Bson {
        Bson::ObjectId(self.0)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for EntityId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|e| StoreError::InvalidIdentifier {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<ObjectId> for EntityId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl From<EntityId> for ObjectId {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl From<EntityId> for Bson {
    fn from(id: EntityId) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl TryFrom<Bson> for EntityId {
    type Error = StoreError;

    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        match value {
            Bson::ObjectId(id) => Ok(Self(id)),
            Bson::String(s) => s.parse(),
            other => Err(StoreError::InvalidIdentifier {
                value: other.to_string(),
                reason: format!("expected an ObjectId, found {:?}", other.element_type()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_hex() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_hex().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), id.to_hex());
    }

    #[test]
    fn test_parse_malformed_is_invalid_identifier() {
        for raw in ["not-a-valid-id", "", "123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            let err = raw.parse::<EntityId>().unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidIdentifier { .. }),
                "Expected InvalidIdentifier for {:?}, got {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_bson_conversion() {
        let id = EntityId::new();
        assert_eq!(EntityId::try_from(id.to_bson()).unwrap(), id);
        assert_eq!(EntityId::try_from(Bson::String(id.to_hex())).unwrap(), id);
        assert!(EntityId::try_from(Bson::Int32(7)).is_err());
    }
}
