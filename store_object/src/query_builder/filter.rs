//! Typed query filters
//!
//! A [`Filter`] is an ordered list of `(field, operator, value)` conditions that
//! all have to hold. It renders to the document form the server understands.

use mongodb::bson::{Bson, Document};
use std::fmt;

use crate::errors::StoreError;
use crate::id_type::EntityId;
use crate::validation::ValidatedFieldName;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,     // $eq
    Ne,     // $ne
    Gt,     // $gt
    Gte,    // $gte
    Lt,     // $lt
    Lte,    // $lte
    In,     // $in
    NotIn,  // $nin
    Exists, // $exists
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::Ne => "$ne",
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::In => "$in",
            FilterOperator::NotIn => "$nin",
            FilterOperator::Exists => "$exists",
        }
    }
}

/// Single condition of a filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Bson,
}

/// Conjunction of field conditions, one level deep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FilterCondition>,
}

impl Filter {
    /// Empty filter; matches every document
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Filter on the document identifier
    pub fn by_id(id: &EntityId) -> Self {
        Self::new().eq("_id", id.to_bson())
    }

    /// Add a condition
    pub fn condition(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Bson>,
    ) -> Self {
        self.conditions.push(FilterCondition {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Equal condition
    pub fn eq(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Eq, value)
    }

    /// Not equal condition
    pub fn ne(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Ne, value)
    }

    /// Greater than condition
    pub fn gt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Gt, value)
    }

    /// Greater than or equal condition
    pub fn gte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Gte, value)
    }

    /// Less than condition
    pub fn lt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Lt, value)
    }

    /// Less than or equal condition
    pub fn lte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.condition(field, FilterOperator::Lte, value)
    }

    /// IN condition
    pub fn in_values<V: Into<Bson>>(self, field: impl Into<String>, values: Vec<V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.condition(field, FilterOperator::In, Bson::Array(values))
    }

    /// NOT IN condition
    pub fn not_in_values<V: Into<Bson>>(self, field: impl Into<String>, values: Vec<V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.condition(field, FilterOperator::NotIn, Bson::Array(values))
    }

    /// Field presence condition
    pub fn exists(self, field: impl Into<String>, present: bool) -> Self {
        self.condition(field, FilterOperator::Exists, present)
    }

    /// Combine with another filter; both sets of conditions must hold
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Render to a filter document
    ///
    /// A lone equality renders as `{field: value}`. Several conditions on one
    /// field share an operator document, `{age: {$gt: 25, $lt: 40}}`. A
    /// condition whose operator is already set on that field goes under
    /// `$and` instead, so every condition still has to hold.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        let mut document = Document::new();
        let mut repeated = Vec::new();

        for condition in &self.conditions {
            let field = ValidatedFieldName::new(&condition.field)?.into_string();
            if matches!(condition.operator, FilterOperator::In | FilterOperator::NotIn)
                && !matches!(condition.value, Bson::Array(_))
            {
                return Err(StoreError::Validation(format!(
                    "{} on '{}' requires an array operand",
                    condition.operator.as_str(),
                    field
                )));
            }

            let operator = condition.operator.as_str();
            let merged = match document.remove(&field) {
                None if condition.operator == FilterOperator::Eq
                    && !is_operator_document(&condition.value) =>
                {
                    condition.value.clone()
                }
                None => single_operator(operator, &condition.value),
                Some(Bson::Document(mut operators)) if is_operator_map(&operators) => {
                    if operators.contains_key(operator) {
                        repeated.push(clause(&field, operator, &condition.value));
                    } else {
                        operators.insert(operator, condition.value.clone());
                    }
                    Bson::Document(operators)
                }
                Some(previous) => {
                    if condition.operator == FilterOperator::Eq {
                        repeated.push(clause(&field, operator, &condition.value));
                        previous
                    } else {
                        let mut operators = Document::new();
                        operators.insert("$eq", previous);
                        operators.insert(operator, condition.value.clone());
                        Bson::Document(operators)
                    }
                }
            };
            document.insert(field, merged);
        }

        if !repeated.is_empty() {
            document.insert("$and", Bson::Array(repeated));
        }

        Ok(document)
    }
}

fn single_operator(operator: &str, value: &Bson) -> Bson {
    let mut operators = Document::new();
    operators.insert(operator, value.clone());
    Bson::Document(operators)
}

/// `{field: {operator: value}}`
fn clause(field: &str, operator: &str, value: &Bson) -> Bson {
    let mut document = Document::new();
    document.insert(field, single_operator(operator, value));
    Bson::Document(document)
}

/// True when every key of the document is an operator (`$...`)
pub(crate) fn is_operator_map(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

fn is_operator_document(value: &Bson) -> bool {
    matches!(value, Bson::Document(inner) if is_operator_map(inner))
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_document() {
            Ok(document) => write!(f, "{}", document),
            Err(_) => write!(f, "{:?}", self.conditions),
        }
    }
}
