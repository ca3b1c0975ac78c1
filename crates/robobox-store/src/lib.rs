//! Document store for RoboBox
//!
//! A small document database: JSON documents grouped into collections,
//! with ordered queries and per-collection change streams. On top of the
//! [`DocumentStore`] trait sit typed views for the site's data:
//! [`ProductCatalog`], [`WorkshopDirectory`] and [`EnquiryBook`].
//!
//! # Quick Start
//!
//! ```no_run
//! use robobox_store::{MemoryStore, ProductCatalog};
//! use std::sync::Arc;
//!
//! # async fn run() -> robobox_store::StoreResult<()> {
//! let catalog = ProductCatalog::new(Arc::new(MemoryStore::new()));
//! for product in catalog.list().await? {
//!     println!("{} - {}", product.name, product.price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Backends
//!
//! - [`MemoryStore`]: process memory, for tests and demos
//! - [`FileSystemStore`]: one JSON file per collection

mod collection;
mod feed;

pub mod catalog;
pub mod config;
pub mod enquiries;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;
pub mod workshops;

// Re-exports - Configuration
pub use config::{ConfigError, StoreBackend, StoreConfig};

// Re-exports - Error
pub use error::{StoreError, StoreResult};

// Re-exports - Backends
pub use feed::DEFAULT_FEED_CAPACITY;
pub use file_system::FileSystemStore;
pub use memory::MemoryStore;
pub use models::*;
pub use traits::*;

// Re-exports - Typed collections
pub use catalog::{ProductCatalog, PRODUCTS};
pub use enquiries::{EnquiryBook, ENQUIRIES};
pub use workshops::{registrations_collection, WorkshopDirectory, WORKSHOPS};
