//! In-memory collection shared by every backend

use chrono::DateTime;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::{Direction, Query, StoreError, StoreResult};

/// Documents of one collection, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Collection {
    docs: IndexMap<String, Value>,
}

impl Collection {
    pub(crate) fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub(crate) fn len(&self) -> usize {
        self.docs.len()
    }

    pub(crate) fn insert(&mut self, name: &str, id: &str, document: Value) -> StoreResult<Value> {
        if self.docs.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                collection: name.to_string(),
                id: id.to_string(),
            });
        }
        let mut object = into_object(document)?;
        object.insert("id".to_string(), Value::String(id.to_string()));

        let stored = Value::Object(object);
        self.docs.insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    pub(crate) fn get(&self, id: &str) -> Option<Value> {
        self.docs.get(id).cloned()
    }

    pub(crate) fn update(&mut self, name: &str, id: &str, patch: Value) -> StoreResult<Value> {
        let patch = into_object(patch)?;
        let doc = self
            .docs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(name, id))?;

        if let Value::Object(fields) = doc {
            for (key, value) in patch {
                // The id field is owned by the store
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        Ok(doc.clone())
    }

    pub(crate) fn delete(&mut self, name: &str, id: &str) -> StoreResult<()> {
        self.docs
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(name, id))
    }

    pub(crate) fn query(&self, query: &Query) -> Vec<Value> {
        let mut matched: Vec<&Value> = self
            .docs
            .values()
            .filter(|doc| {
                query
                    .filters
                    .iter()
                    .all(|(field, expected)| doc.get(field) == Some(expected))
            })
            .collect();

        if let Some(order) = &query.order_by {
            // Stable: ties keep insertion order
            matched.sort_by(|a, b| {
                compare_fields(a.get(&order.field), b.get(&order.field), order.direction)
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        matched.into_iter().take(limit).cloned().collect()
    }
}

/// Typed model to stored document
pub(crate) fn to_document<T: Serialize>(model: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(model)?)
}

/// Stored document to typed model
pub(crate) fn from_document<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    serde_json::from_value(document).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

pub(crate) fn from_documents<T: DeserializeOwned>(documents: Vec<Value>) -> StoreResult<Vec<T>> {
    documents.into_iter().map(from_document).collect()
}

fn into_object(document: Value) -> StoreResult<Map<String, Value>> {
    match document {
        Value::Object(object) => Ok(object),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Documents missing the field sort last in either direction
fn compare_fields(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// RFC 3339 strings compare as instants, other strings lexically
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
