//! REST API type definitions
//!
//! Request and response types for the REST API endpoints.

use crate::reveal_sessions::RevealSessions;
use robobox_core::auth::{AdminPolicy, Identity, IdentityProvider, SignedIn};
use robobox_core::reveal::PointerEvent;
use robobox_core::search::{SearchIndex, SearchItem};
use robobox_core::EnquiryStatus;
use robobox_llm::FaqFlow;
use robobox_store::{EnquiryBook, ProductCatalog, WorkshopDirectory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub faq: Arc<FaqFlow>,
    pub reveals: Arc<RevealSessions>,
    pub products: ProductCatalog,
    pub workshops: WorkshopDirectory,
    pub enquiries: EnquiryBook,
    pub identity: Arc<dyn IdentityProvider>,
    pub admin: Arc<AdminPolicy>,
    pub search: Arc<SearchIndex>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    pub question: String,
}

/// Batch of pointer input for one reveal session
#[derive(Debug, Deserialize)]
pub struct PointerRequest {
    #[serde(default)]
    pub events: Vec<PointerEvent>,
}

/// `?wait=true` blocks until an outstanding discount fetch has landed
#[derive(Debug, Default, Deserialize)]
pub struct WaitQuery {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub code: String,
}

/// Returned by every successful sign-in
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub identity: Identity,
    pub is_admin: bool,
    /// Where the client should navigate next
    pub landing: &'static str,
}

impl SignInResponse {
    pub fn new(signed: SignedIn, policy: &AdminPolicy) -> Self {
        Self {
            is_admin: policy.is_admin(&signed.identity),
            landing: policy.landing(&signed.identity),
            token: signed.token,
            identity: signed.identity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub identity: Identity,
    pub is_admin: bool,
    pub landing: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RegistrationStatus {
    pub registered: bool,
}

/// Acknowledgement for a submitted school enquiry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryReceipt {
    pub success: bool,
    pub id: String,
    pub school_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: EnquiryStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchItem>,
}
