//! School enquiries

use chrono::Utc;
use robobox_core::{Enquiry, EnquiryInput, EnquiryStatus, Validate};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::collection::{from_document, from_documents, to_document};
use crate::{ChangeEvent, DocumentStore, Query, StoreResult};

pub const ENQUIRIES: &str = "enquiries";

/// Typed access to the `enquiries` collection
#[derive(Clone)]
pub struct EnquiryBook {
    store: Arc<dyn DocumentStore>,
}

impl EnquiryBook {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and store a new enquiry as `Pending`
    pub async fn submit(&self, input: EnquiryInput) -> StoreResult<Enquiry> {
        input.validate()?;

        let mut enquiry = Enquiry::from_input(input, Utc::now());
        enquiry.id = self.store.insert(ENQUIRIES, to_document(&enquiry)?).await?;

        info!("Enquiry {} received from {}", enquiry.id, enquiry.school_name);
        Ok(enquiry)
    }

    /// All enquiries, newest first
    pub async fn list(&self) -> StoreResult<Vec<Enquiry>> {
        let docs = self
            .store
            .list(ENQUIRIES, &Query::new().newest_first("createdAt"))
            .await?;
        from_documents(docs)
    }

    pub async fn set_status(&self, id: &str, status: EnquiryStatus) -> StoreResult<Enquiry> {
        let stored = self
            .store
            .update(ENQUIRIES, id, json!({ "status": status }))
            .await?;

        info!("Enquiry {} marked {:?}", id, status);
        from_document(stored)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.store.subscribe(ENQUIRIES)
    }
}
