//! In-memory document store

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::{
    validate_collection, validate_id, ChangeEvent, ChangeKind, DocumentStore, Query, StoreResult,
};

/// Store kept entirely in process memory
///
/// Used for tests and for running the server without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Collection::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<String> {
        let id = Collection::new_id();
        self.insert_with_id(collection, &id, document).await?;
        Ok(id)
    }

    async fn insert_with_id(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        validate_collection(collection)?;
        validate_id(collection, id)?;

        let stored = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(collection, id, document)?
        };

        debug!("Inserted {}/{}", collection, id);
        self.feed.publish(ChangeEvent {
            collection: collection.to_string(),
            kind: ChangeKind::Created,
            id: id.to_string(),
            document: Some(stored),
        });
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id)))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value> {
        validate_collection(collection)?;

        let updated = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .update(collection, id, patch)?
        };

        debug!("Updated {}/{}", collection, id);
        self.feed.publish(ChangeEvent {
            collection: collection.to_string(),
            kind: ChangeKind::Updated,
            id: id.to_string(),
            document: Some(updated.clone()),
        });
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        validate_collection(collection)?;

        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .delete(collection, id)?;
        }

        debug!("Deleted {}/{}", collection, id);
        self.feed.publish(ChangeEvent {
            collection: collection.to_string(),
            kind: ChangeKind::Deleted,
            id: id.to_string(),
            document: None,
        });
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.query(query))
            .unwrap_or_default())
    }

    fn subscribe(&self, collection: &str) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe(collection)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
