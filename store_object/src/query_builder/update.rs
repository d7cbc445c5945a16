use mongodb::bson::{Bson, Document};

use crate::errors::StoreError;
use crate::validation::ValidatedFieldName;

/// Type of update operation to perform on a field
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperation {
    /// Set field to a specific value: `$set`
    Set(Bson),

    /// Remove the field: `$unset`
    Unset,

    /// Add a number to the field, creating it when missing: `$inc`
    Increment(Bson),
}

impl UpdateOperation {
    /// Update operator this operation is rendered under
    pub fn operator(&self) -> &'static str {
        match self {
            UpdateOperation::Set(_) => "$set",
            UpdateOperation::Unset => "$unset",
            UpdateOperation::Increment(_) => "$inc",
        }
    }

    fn operand(&self) -> Bson {
        match self {
            UpdateOperation::Set(value) | UpdateOperation::Increment(value) => value.clone(),
            UpdateOperation::Unset => Bson::String(String::new()),
        }
    }
}

/// Partial, field-level update
///
/// Fields keep insertion order; setting the same field twice keeps the last
/// operation only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSet {
    operations: Vec<(String, UpdateOperation)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Set a field to a specific value
    pub fn set(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.push(field.into(), UpdateOperation::Set(value.into()))
    }

    /// Remove a field
    pub fn unset(self, field: impl Into<String>) -> Self {
        self.push(field.into(), UpdateOperation::Unset)
    }

    /// Increment a field by a value (atomic on the server)
    pub fn increment(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.push(field.into(), UpdateOperation::Increment(value.into()))
    }

    fn push(mut self, field: String, operation: UpdateOperation) -> Self {
        self.operations.retain(|(existing, _)| *existing != field);
        self.operations.push((field, operation));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[(String, UpdateOperation)] {
        &self.operations
    }

    /// Render to an update document, e.g. `{$set: {age: 31}, $unset: {email: ""}}`
    pub fn to_document(&self) -> Result<Document, StoreError> {
        if self.operations.is_empty() {
            return Err(StoreError::Validation(
                "Update requires at least one field operation".to_string(),
            ));
        }

        let mut document = Document::new();
        for (field, operation) in &self.operations {
            let field = ValidatedFieldName::new(field)?.into_string();
            if field == "_id" {
                return Err(StoreError::Validation(
                    "The _id field is immutable".to_string(),
                ));
            }
            if let UpdateOperation::Increment(value) = operation {
                if !matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) {
                    return Err(StoreError::Validation(format!(
                        "$inc on '{}' requires a numeric operand",
                        field
                    )));
                }
            }

            let section = document
                .entry(operation.operator().to_string())
                .or_insert_with(|| Bson::Document(Document::new()));
            if let Bson::Document(section) = section {
                section.insert(field, operation.operand());
            }
        }

        Ok(document)
    }
}
