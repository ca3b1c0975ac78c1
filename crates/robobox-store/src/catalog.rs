//! Product catalog

use chrono::Utc;
use robobox_core::{Product, ProductInput, Validate};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::collection::{from_document, from_documents, to_document};
use crate::{ChangeEvent, DocumentStore, Query, StoreError, StoreResult};

pub const PRODUCTS: &str = "products";

/// Typed access to the `products` collection
#[derive(Clone)]
pub struct ProductCatalog {
    store: Arc<dyn DocumentStore>,
}

impl ProductCatalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All products, newest first
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let docs = self
            .store
            .list(PRODUCTS, &Query::new().newest_first("createdAt"))
            .await?;
        from_documents(docs)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Product> {
        self.store
            .get(PRODUCTS, id)
            .await?
            .ok_or_else(|| StoreError::not_found(PRODUCTS, id))
            .and_then(from_document)
    }

    pub async fn create(&self, input: ProductInput) -> StoreResult<Product> {
        input.validate()?;

        let mut product = Product::from_input(input, Utc::now());
        product.id = self.store.insert(PRODUCTS, to_document(&product)?).await?;

        info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// Replace the editable fields of an existing product
    pub async fn update(&self, id: &str, input: ProductInput) -> StoreResult<Product> {
        input.validate()?;

        let mut product = self.get(id).await?;
        product.apply(input);
        let stored = self
            .store
            .update(PRODUCTS, id, to_document(&product)?)
            .await?;

        info!("Updated product {}", id);
        from_document(stored)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(PRODUCTS, id).await?;
        info!("Deleted product {}", id);
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.store.subscribe(PRODUCTS)
    }
}
