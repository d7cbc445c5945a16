//! Entity trait
//!
//! Records stored through a repository.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::id_type::EntityId;

/// A typed record persisted in a collection
///
/// The identifier lives in the document's `_id` field, so implementors rename
/// their id field and skip it while unassigned:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use store_object::{Entity, EntityId};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Person {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<EntityId>,
///     pub name: String,
///     pub age: i32,
/// }
///
/// impl Entity for Person {
///     fn id(&self) -> Option<EntityId> {
///         self.id
///     }
/// }
/// ```
pub trait Entity: Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Identifier already assigned to this record, if any
    fn id(&self) -> Option<EntityId>;
}
