//! Workshops and their registrations

use chrono::Utc;
use robobox_core::auth::Identity;
use robobox_core::{Registration, Validate, Workshop, WorkshopInput};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::collection::{from_document, from_documents, to_document};
use crate::{ChangeEvent, DocumentStore, Query, StoreError, StoreResult};

pub const WORKSHOPS: &str = "workshops";

/// Sub-collection holding one workshop's registrations
pub fn registrations_collection(workshop_id: &str) -> String {
    format!("{}/{}/registrations", WORKSHOPS, workshop_id)
}

/// Typed access to `workshops` and `workshops/{id}/registrations`
///
/// Registrations are keyed by user id, which is what keeps them unique per
/// (workshop, user).
#[derive(Clone)]
pub struct WorkshopDirectory {
    store: Arc<dyn DocumentStore>,
}

impl WorkshopDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All workshops, newest first
    pub async fn list(&self) -> StoreResult<Vec<Workshop>> {
        let docs = self
            .store
            .list(WORKSHOPS, &Query::new().newest_first("createdAt"))
            .await?;
        from_documents(docs)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Workshop> {
        self.store
            .get(WORKSHOPS, id)
            .await?
            .ok_or_else(|| StoreError::not_found(WORKSHOPS, id))
            .and_then(from_document)
    }

    pub async fn create(&self, input: WorkshopInput) -> StoreResult<Workshop> {
        input.validate()?;

        let mut workshop = Workshop::from_input(input, Utc::now());
        workshop.id = self.store.insert(WORKSHOPS, to_document(&workshop)?).await?;

        info!("Created workshop {} ({})", workshop.id, workshop.title);
        Ok(workshop)
    }

    /// Register a signed-in user; a second attempt is `AlreadyRegistered`
    pub async fn register(
        &self,
        workshop_id: &str,
        identity: &Identity,
    ) -> StoreResult<Registration> {
        self.get(workshop_id).await?;

        let registration = Registration {
            id: identity.uid.clone(),
            workshop_id: workshop_id.to_string(),
            user_id: identity.uid.clone(),
            user_name: identity.label(),
            user_email: identity.email.clone(),
            registered_at: Utc::now(),
        };

        let collection = registrations_collection(workshop_id);
        match self
            .store
            .insert_with_id(&collection, &identity.uid, to_document(&registration)?)
            .await
        {
            Ok(()) => {
                info!("Registered {} for workshop {}", identity.uid, workshop_id);
                Ok(registration)
            }
            Err(StoreError::AlreadyExists { .. }) => Err(StoreError::AlreadyRegistered {
                workshop_id: workshop_id.to_string(),
                user_id: identity.uid.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn is_registered(&self, workshop_id: &str, user_id: &str) -> StoreResult<bool> {
        let existing = self
            .store
            .get(&registrations_collection(workshop_id), user_id)
            .await?;
        Ok(existing.is_some())
    }

    /// Registrations for one workshop, most recent first
    pub async fn registrations(&self, workshop_id: &str) -> StoreResult<Vec<Registration>> {
        self.get(workshop_id).await?;

        let docs = self
            .store
            .list(
                &registrations_collection(workshop_id),
                &Query::new().newest_first("registeredAt"),
            )
            .await?;
        from_documents(docs)
    }

    /// Changes to the workshop list itself
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.store.subscribe(WORKSHOPS)
    }

    pub fn subscribe_registrations(
        &self,
        workshop_id: &str,
    ) -> broadcast::Receiver<ChangeEvent> {
        self.store.subscribe(&registrations_collection(workshop_id))
    }
}
