//! REST API implementation
//!
//! - types: Request/response type definitions and shared state
//! - extractors: JSON body and bearer-token extractors
//! - handlers: API endpoint handlers
//! - streams: server-sent change events
//! - router: Router creation and configuration

mod extractors;
mod handlers;
mod router;
mod streams;
mod tests;
pub mod types;

// Re-export public API
pub use extractors::{AdminUser, CurrentUser, JsonExtractor, Session};
pub use router::create_router;
pub use types::{
    AppState, CredentialsRequest, EnquiryReceipt, FaqRequest, HealthResponse,
    MeResponse, OtpRequest, OtpVerifyRequest, PointerRequest, RegistrationStatus, SearchQuery,
    SearchResponse, SignInResponse, StatusUpdateRequest, WaitQuery,
};
