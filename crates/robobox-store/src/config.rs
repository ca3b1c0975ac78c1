//! Store configuration types
//!
//! Selects the backend the server persists products, workshops and
//! enquiries to.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{DocumentStore, FileSystemStore, MemoryStore, StoreError, StoreResult};

/// Store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Keep documents in process memory
    #[default]
    Memory,
    /// One JSON file per collection under `path`
    #[serde(alias = "filesystem")]
    FileSystem,
}

/// Store configuration
///
/// # Examples
///
/// ```rust
/// use robobox_store::StoreConfig;
///
/// // In-memory store (tests, demos)
/// let config = StoreConfig::memory();
///
/// // Persist under ./data
/// let config = StoreConfig::file_system("data");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Data directory (required for the file system backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
        }
    }

    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            backend: StoreBackend::FileSystem,
            path: Some(path.into()),
        }
    }

    /// Returns an error if the selected backend is missing a required field
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StoreBackend::FileSystem if self.path.as_deref().map_or(true, str::is_empty) => {
                Err(ConfigError::MissingField {
                    backend: "file_system".to_string(),
                    field: "path".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Open the configured backend
    pub async fn open(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        self.validate()
            .map_err(|e| StoreError::Other(e.to_string()))?;

        match (self.backend, self.path.as_deref()) {
            (StoreBackend::FileSystem, Some(path)) => {
                Ok(Arc::new(FileSystemStore::open(path).await?))
            }
            _ => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required field is missing for the selected backend
    MissingField { backend: String, field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingField { backend, field } => {
                write!(f, "{} backend requires {} to be set", backend, field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config() {
        let config = StoreConfig::memory();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert!(config.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_system_config() {
        let config = StoreConfig::file_system("data");
        assert_eq!(config.backend, StoreBackend::FileSystem);
        assert_eq!(config.path.as_deref(), Some("data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_path() {
        let config = StoreConfig {
            backend: StoreBackend::FileSystem,
            path: None,
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            backend: StoreBackend::FileSystem,
            path: Some(String::new()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_names() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"backend": "file_system", "path": "data"}"#).unwrap();
        assert_eq!(config.backend, StoreBackend::FileSystem);

        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[tokio::test]
    async fn test_open_memory() {
        let store = StoreConfig::memory().open().await.unwrap();
        assert_eq!(store.name(), "memory");
    }
}
