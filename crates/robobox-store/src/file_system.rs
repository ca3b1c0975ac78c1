//! File system backed document store
//!
//! Each collection lives in one JSON file under the root directory, so
//! `workshops/w-1/registrations` is stored at
//! `<root>/workshops/w-1/registrations.json`. Files are loaded on first use
//! and rewritten in full on every write.

use async_trait::async_trait;
use path_absolutize::Absolutize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::{
    validate_collection, validate_id, ChangeEvent, ChangeKind, DocumentStore, Query, StoreError,
    StoreResult,
};

/// Document store persisted as JSON files on disk
#[derive(Debug)]
pub struct FileSystemStore {
    /// Absolute root directory
    root_path: PathBuf,
    /// Collections loaded so far
    collections: RwLock<HashMap<String, Collection>>,
    feed: ChangeFeed,
}

impl FileSystemStore {
    /// Open a store rooted at `root_path`, creating the directory if needed
    ///
    /// # Example
    /// ```no_run
    /// use robobox_store::FileSystemStore;
    ///
    /// # async fn run() -> robobox_store::StoreResult<()> {
    /// let store = FileSystemStore::open("data").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open<P: AsRef<Path>>(root_path: P) -> StoreResult<Self> {
        let path = root_path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir_all(path).await?;
        if !fs::metadata(path).await?.is_dir() {
            return Err(StoreError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| StoreError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        info!("Opened file system store at {}", abs_path.display());

        Ok(Self {
            root_path: abs_path,
            collections: RwLock::new(HashMap::new()),
            feed: ChangeFeed::default(),
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.extend(collection.split('/'));
        path.set_extension("json");
        path
    }

    async fn read_collection(&self, collection: &str) -> StoreResult<Collection> {
        let path = self.collection_path(collection);
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let loaded: Collection = serde_json::from_str(&content)?;
                debug!(
                    "Loaded {} document(s) from {}",
                    loaded.len(),
                    path.display()
                );
                Ok(loaded)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Collection::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the old file
    async fn write_collection(&self, collection: &str, docs: &Collection) -> StoreResult<()> {
        let path = self.collection_path(collection);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(docs)?;
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    /// Run a read against a collection, loading it first if needed
    async fn read_with<T>(
        &self,
        collection: &str,
        op: impl FnOnce(&Collection) -> T,
    ) -> StoreResult<T> {
        {
            let collections = self.collections.read().await;
            if let Some(docs) = collections.get(collection) {
                return Ok(op(docs));
            }
        }

        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get(collection) {
            return Ok(op(docs));
        }
        let loaded = self.read_collection(collection).await?;
        Ok(op(collections.entry(collection.to_string()).or_insert(loaded)))
    }

    /// Apply a write and persist it; memory is only updated once the file is written
    async fn write_with<T>(
        &self,
        collection: &str,
        op: impl FnOnce(&mut Collection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collections = self.collections.write().await;
        let mut working = match collections.get(collection) {
            Some(docs) => docs.clone(),
            None => self.read_collection(collection).await?,
        };

        let out = op(&mut working)?;
        self.write_collection(collection, &working).await?;
        collections.insert(collection.to_string(), working);
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for FileSystemStore {
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<String> {
        let id = Collection::new_id();
        self.insert_with_id(collection, &id, document).await?;
        Ok(id)
    }

    async fn insert_with_id(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        validate_collection(collection)?;
        validate_id(collection, id)?;

        let stored = self
            .write_with(collection, |docs| docs.insert(collection, id, document))
            .await?;

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
        self.read_with(collection, |docs| docs.get(id)).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value> {
        validate_collection(collection)?;

        let updated = self
            .write_with(collection, |docs| docs.update(collection, id, patch))
            .await?;

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

        self.write_with(collection, |docs| docs.delete(collection, id))
            .await?;

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
        self.read_with(collection, |docs| docs.query(query)).await
    }

    fn subscribe(&self, collection: &str) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe(collection)
    }

    fn name(&self) -> &str {
        "file_system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_collection_paths() {
        let temp = TempDir::new().unwrap();
        let store = FileSystemStore::open(temp.path()).await.unwrap();

        assert_eq!(
            store.collection_path("workshops/w-1/registrations"),
            store
                .root_path()
                .join("workshops")
                .join("w-1")
                .join("registrations.json")
        );
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let temp = TempDir::new().unwrap();

        let id = {
            let store = FileSystemStore::open(temp.path()).await.unwrap();
            let id = store.insert("products", json!({"name": "Kit"})).await.unwrap();
            store
                .insert_with_id("workshops/w-1/registrations", "u1", json!({"userId": "u1"}))
                .await
                .unwrap();
            id
        };

        let store = FileSystemStore::open(temp.path()).await.unwrap();
        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "Kit");
        assert_eq!(doc["id"], id.as_str());

        let regs = store
            .list("workshops/w-1/registrations", &Query::new())
            .await
            .unwrap();
        assert_eq!(regs.len(), 1);
        assert!(!temp.path().join("products.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let store = FileSystemStore::open(temp.path()).await.unwrap();
        store.insert_with_id("products", "p1", json!({"n": 1})).await.unwrap();

        let before = std::fs::read_to_string(temp.path().join("products.json")).unwrap();
        assert!(store.insert_with_id("products", "p1", json!({"n": 2})).await.is_err());
        let after = std::fs::read_to_string(temp.path().join("products.json")).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("products.json"), "not json").unwrap();

        let store = FileSystemStore::open(temp.path()).await.unwrap();
        assert!(matches!(
            store.list("products", &Query::new()).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_file_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(FileSystemStore::open(&file).await.is_err());
    }
}
