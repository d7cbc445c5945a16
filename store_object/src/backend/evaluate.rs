//! In-process evaluation of filter and update documents
//!
//! Covers the operator subset produced by [`Filter`](crate::query_builder::Filter)
//! and [`UpdateSet`](crate::query_builder::UpdateSet). Numbers compare across
//! int32, int64 and double the way the server does.

use mongodb::bson::{Bson, Document};
use std::cmp::Ordering;

use crate::errors::StoreError;
use crate::query_builder::filter::is_operator_map;

/// Does `document` satisfy every condition of `filter`?
pub fn matches(document: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (field, criterion) in filter {
        if field.starts_with('$') {
            if !logical(document, field, criterion)? {
                return Ok(false);
            }
            continue;
        }
        let value = get_path(document, field);
        let satisfied = match criterion {
            Bson::Document(operators) if is_operator_map(operators) => {
                let mut all = true;
                for (operator, operand) in operators {
                    if !apply_operator(value, operator, operand)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            expected => equals_or_contains(value, expected),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Top-level logical operator; only `$and` is produced by `Filter`
fn logical(document: &Document, operator: &str, operand: &Bson) -> Result<bool, StoreError> {
    if operator != "$and" {
        return Err(StoreError::Validation(format!(
            "Unsupported top-level operator '{}'",
            operator
        )));
    }
    let clauses = match operand {
        Bson::Array(clauses) if !clauses.is_empty() => clauses,
        _ => {
            return Err(StoreError::Validation(
                "$and requires a non-empty array of documents".to_string(),
            ))
        }
    };
    for clause in clauses {
        match clause {
            Bson::Document(clause) => {
                if !matches(document, clause)? {
                    return Ok(false);
                }
            }
            _ => {
                return Err(StoreError::Validation(
                    "$and requires a non-empty array of documents".to_string(),
                ))
            }
        }
    }
    Ok(true)
}

fn apply_operator(value: Option<&Bson>, operator: &str, operand: &Bson) -> Result<bool, StoreError> {
    let outcome = match operator {
        "$eq" => equals_or_contains(value, operand),
        "$ne" => !equals_or_contains(value, operand),
        "$gt" => ordered(value, operand, |o| o == Ordering::Greater),
        "$gte" => ordered(value, operand, |o| o != Ordering::Less),
        "$lt" => ordered(value, operand, |o| o == Ordering::Less),
        "$lte" => ordered(value, operand, |o| o != Ordering::Greater),
        "$in" => in_list(value, operand, operator)?,
        "$nin" => !in_list(value, operand, operator)?,
        "$exists" => {
            let wanted = match operand {
                Bson::Boolean(b) => *b,
                other => is_truthy(other),
            };
            value.is_some() == wanted
        }
        other => {
            return Err(StoreError::Validation(format!(
                "Unsupported filter operator '{}'",
                other
            )))
        }
    };
    Ok(outcome)
}

fn in_list(value: Option<&Bson>, operand: &Bson, operator: &str) -> Result<bool, StoreError> {
    match operand {
        Bson::Array(candidates) => Ok(candidates
            .iter()
            .any(|candidate| equals_or_contains(value, candidate))),
        _ => Err(StoreError::Validation(format!(
            "{} requires an array operand",
            operator
        ))),
    }
}

/// Equality with the server's array semantics: an array field matches when
/// it equals the operand or contains it. A missing field equals null.
fn equals_or_contains(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(actual) => {
            values_equal(actual, expected)
                || matches!(actual, Bson::Array(items) if items.iter().any(|item| values_equal(item, expected)))
        }
    }
}

/// Comparison operators only match values of a comparable type
fn ordered(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        None => false,
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare(item, operand).is_some_and(&accept)),
        Some(actual) => compare(actual, operand).is_some_and(accept),
    }
}

pub(crate) fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(_), Some(_)) => compare(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::Int32(x), Bson::Int32(y)) => Some(x.cmp(y)),
        (Bson::Int64(x), Bson::Int64(y)) => Some(x.cmp(y)),
        (Bson::Int32(x), Bson::Int64(y)) => Some(i64::from(*x).cmp(y)),
        (Bson::Int64(x), Bson::Int32(y)) => Some(x.cmp(&i64::from(*y))),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => false,
        Bson::Boolean(b) => *b,
        other => as_number(other).map_or(true, |n| n != 0.0),
    }
}

/// Look up a dotted path (`address.city`)
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<(), String> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Bson::Document(Document::new()));
            match child {
                Bson::Document(inner) => set_path(inner, rest, value),
                other => Err(format!(
                    "cannot create field '{}' in non-document element {:?}",
                    rest,
                    other.element_type()
                )),
            }
        }
    }
}

fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                unset_path(inner, rest);
            }
        }
    }
}

fn add_numbers(current: Option<&Bson>, delta: &Bson) -> Result<Bson, String> {
    let sum = match (current, delta) {
        (None, delta) => delta.clone(),
        (Some(Bson::Int32(x)), Bson::Int32(y)) => match x.checked_add(*y) {
            Some(n) => Bson::Int32(n),
            None => Bson::Int64(i64::from(*x) + i64::from(*y)),
        },
        (Some(Bson::Int32(x)), Bson::Int64(y)) => {
            Bson::Int64(i64::from(*x).checked_add(*y).ok_or("integer overflow")?)
        }
        (Some(Bson::Int64(x)), Bson::Int32(y)) => {
            Bson::Int64(x.checked_add(i64::from(*y)).ok_or("integer overflow")?)
        }
        (Some(Bson::Int64(x)), Bson::Int64(y)) => {
            Bson::Int64(x.checked_add(*y).ok_or("integer overflow")?)
        }
        (Some(current), delta) => match (as_number(current), as_number(delta)) {
            (Some(x), Some(y)) => Bson::Double(x + y),
            _ => {
                return Err(format!(
                    "cannot apply $inc to a value of type {:?}",
                    current.element_type()
                ))
            }
        },
    };
    Ok(sum)
}

/// Apply an update document in place; returns whether the document changed
///
/// The document is left untouched when the update fails.
pub fn apply_update(
    document: &mut Document,
    update: &Document,
    collection: &str,
) -> Result<bool, StoreError> {
    if !is_operator_map(update) {
        return Err(StoreError::Validation(
            "Update document must only contain update operators".to_string(),
        ));
    }

    let mut updated = document.clone();
    for (operator, fields) in update {
        let fields = match fields {
            Bson::Document(fields) => fields,
            _ => {
                return Err(StoreError::Validation(format!(
                    "{} requires a document operand",
                    operator
                )))
            }
        };
        for (path, operand) in fields {
            if path == "_id" || path.starts_with("_id.") {
                return Err(StoreError::write(
                    collection,
                    "Performing an update on the path '_id' would modify the immutable field '_id'",
                ));
            }
            match operator.as_str() {
                "$set" => set_path(&mut updated, path, operand.clone())
                    .map_err(|message| StoreError::write(collection, message))?,
                "$unset" => unset_path(&mut updated, path),
                "$inc" => {
                    let sum = add_numbers(get_path(&updated, path), operand)
                        .map_err(|message| StoreError::write(collection, message))?;
                    set_path(&mut updated, path, sum)
                        .map_err(|message| StoreError::write(collection, message))?;
                }
                other => {
                    return Err(StoreError::Validation(format!(
                        "Unsupported update operator '{}'",
                        other
                    )))
                }
            }
        }
    }

    let modified = updated != *document;
    *document = updated;
    Ok(modified)
}
