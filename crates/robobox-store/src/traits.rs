//! Core trait definitions for the document store
//!
//! Documents are JSON objects grouped in collections. Collection paths use
//! `/` separators with an odd number of segments, so
//! `workshops/{id}/registrations` names the registration sub-collection of
//! one workshop.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{ChangeEvent, Query, StoreError, StoreResult};

/// Document store
///
/// # Implementation Notes
///
/// - Stored documents always carry their id in an `id` field
/// - `update` merges top-level fields of the patch into the document
/// - Every successful write publishes one [`ChangeEvent`] to subscribers of
///   that collection; subscribers that lag behind skip events
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document under a generated id and return the id
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<String>;

    /// Add a document under a caller-chosen id; `AlreadyExists` if taken
    async fn insert_with_id(&self, collection: &str, id: &str, document: Value) -> StoreResult<()>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Merge `patch` into an existing document and return the result
    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value>;

    /// Remove a document; `NotFound` if absent
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Receive change events for one collection from now on
    fn subscribe(&self, collection: &str) -> broadcast::Receiver<ChangeEvent>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Check a collection path: odd count of non-empty `[A-Za-z0-9_-]` segments
pub fn validate_collection(name: &str) -> StoreResult<()> {
    let segments: Vec<&str> = name.split('/').collect();
    let well_formed = segments.len() % 2 == 1
        && segments.iter().all(|s| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if well_formed {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection {
            name: name.to_string(),
        })
    }
}

/// Document ids share the segment alphabet
pub fn validate_id(collection: &str, id: &str) -> StoreResult<()> {
    if !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument(format!(
            "invalid id '{}' in {}",
            id, collection
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert!(validate_collection("products").is_ok());
        assert!(validate_collection("workshops/w-1/registrations").is_ok());

        assert!(validate_collection("").is_err());
        assert!(validate_collection("workshops/w-1").is_err());
        assert!(validate_collection("../etc").is_err());
        assert!(validate_collection("products//x").is_err());
        assert!(validate_collection("pro ducts").is_err());
    }

    #[test]
    fn test_ids() {
        assert!(validate_id("products", "a1b2-c3_d").is_ok());
        assert!(validate_id("products", "").is_err());
        assert!(validate_id("products", "a/b").is_err());
        assert!(validate_id("products", "..").is_err());
    }
}
