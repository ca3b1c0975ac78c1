//! Error types for the document store

use robobox_core::{CoreError, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document with that id
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A document with that id already exists
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// The user already holds a registration for the workshop
    #[error("Already registered for workshop {workshop_id}")]
    AlreadyRegistered { workshop_id: String, user_id: String },

    /// Collection path is malformed
    #[error("Invalid collection name: {name}")]
    InvalidCollection { name: String },

    /// Document is not a JSON object or does not match its model
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Form values failed validation
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid root path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Generic error
    #[error("Store error: {0}")]
    Other(String),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => StoreError::Validation(errors),
            other => StoreError::InvalidDocument(other.to_string()),
        }
    }
}

impl From<Vec<ValidationError>> for StoreError {
    fn from(errors: Vec<ValidationError>) -> Self {
        StoreError::Validation(errors)
    }
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
