//! API endpoint handlers
//!
//! HTTP request handlers for all REST API endpoints.

use super::extractors::{AdminUser, CurrentUser, JsonExtractor, Session};
use super::streams::change_stream;
use super::types::*;
use crate::error::ServerError;
use crate::reveal_sessions::{CopyOutcome, SessionView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use robobox_core::auth::{AuthSession, FederatedAssertion};
use robobox_core::{
    Enquiry, EnquiryInput, FaqAnswer, Product, ProductInput, Registration, Workshop,
    WorkshopInput,
};
use tracing::info;
use uuid::Uuid;

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// FAQ
// =============================================================================

pub(super) async fn ask_faq(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<FaqRequest>,
) -> Result<Json<FaqAnswer>, ServerError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Question must not be empty".to_string(),
        ));
    }

    info!("FAQ question received ({} chars)", question.len());
    let answer = state.faq.answer(question).await?;
    Ok(Json(answer))
}

// =============================================================================
// Scratch reveal
// =============================================================================

fn session_id(raw: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw)
        .map_err(|_| ServerError::InvalidRequest(format!("Invalid reveal session id: {}", raw)))
}

async fn settled_view(
    state: &AppState,
    id: Uuid,
    wait: bool,
) -> Result<Json<SessionView>, ServerError> {
    if wait {
        state.reveals.settle(id).await?;
    }
    Ok(Json(state.reveals.view(id).await?))
}

pub(super) async fn create_reveal(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(state.reveals.create().await))
}

pub(super) async fn get_reveal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<SessionView>, ServerError> {
    settled_view(&state, session_id(&id)?, query.wait).await
}

pub(super) async fn delete_reveal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.reveals.remove(session_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn reveal_pointer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WaitQuery>,
    JsonExtractor(payload): JsonExtractor<PointerRequest>,
) -> Result<Json<SessionView>, ServerError> {
    let id = session_id(&id)?;
    state.reveals.pointer(id, &payload.events).await?;
    settled_view(&state, id, query.wait).await
}

pub(super) async fn reveal_instantly(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<SessionView>, ServerError> {
    let id = session_id(&id)?;
    state.reveals.reveal(id).await?;
    settled_view(&state, id, query.wait).await
}

pub(super) async fn retry_reveal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<SessionView>, ServerError> {
    let id = session_id(&id)?;
    state.reveals.retry(id).await?;
    settled_view(&state, id, query.wait).await
}

pub(super) async fn copy_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CopyOutcome>, ServerError> {
    Ok(Json(state.reveals.copy(session_id(&id)?).await?))
}

// =============================================================================
// Auth
// =============================================================================

pub(super) async fn sign_up(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<CredentialsRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let signed = state
        .identity
        .sign_up(&payload.email, &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SignInResponse::new(signed, &state.admin)),
    ))
}

pub(super) async fn sign_in(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<CredentialsRequest>,
) -> Result<Json<SignInResponse>, ServerError> {
    let signed = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await?;
    Ok(Json(SignInResponse::new(signed, &state.admin)))
}

pub(super) async fn sign_in_federated(
    State(state): State<AppState>,
    JsonExtractor(assertion): JsonExtractor<FederatedAssertion>,
) -> Result<Json<SignInResponse>, ServerError> {
    let signed = state.identity.sign_in_federated(&assertion).await?;
    Ok(Json(SignInResponse::new(signed, &state.admin)))
}

pub(super) async fn request_otp(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<OtpRequest>,
) -> Result<StatusCode, ServerError> {
    state.identity.request_otp(&payload.phone).await?;
    Ok(StatusCode::ACCEPTED)
}

pub(super) async fn verify_otp(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<OtpVerifyRequest>,
) -> Result<Json<SignInResponse>, ServerError> {
    let signed = state
        .identity
        .verify_otp(&payload.phone, &payload.code)
        .await?;
    Ok(Json(SignInResponse::new(signed, &state.admin)))
}

/// Always succeeds; unknown or missing tokens are already signed out
pub(super) async fn sign_out(
    State(state): State<AppState>,
    Session(mut session): Session,
) -> Result<StatusCode, ServerError> {
    session.sign_out(state.identity.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Json<MeResponse> {
    Json(MeResponse {
        is_admin: state.admin.is_admin(&identity),
        landing: state.admin.landing(&identity),
        identity,
    })
}

// =============================================================================
// Products
// =============================================================================

pub(super) async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ServerError> {
    Ok(Json(state.products.list().await?))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServerError> {
    Ok(Json(state.products.get(&id).await?))
}

pub(super) async fn product_stream(State(state): State<AppState>) -> impl IntoResponse {
    change_stream(state.products.subscribe())
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonExtractor(input): JsonExtractor<ProductInput>,
) -> Result<impl IntoResponse, ServerError> {
    let product = state.products.create(input).await?;
    info!("{} added product {}", admin.label(), product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    JsonExtractor(input): JsonExtractor<ProductInput>,
) -> Result<Json<Product>, ServerError> {
    Ok(Json(state.products.update(&id, input).await?))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.products.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Workshops
// =============================================================================

pub(super) async fn list_workshops(
    State(state): State<AppState>,
) -> Result<Json<Vec<Workshop>>, ServerError> {
    Ok(Json(state.workshops.list().await?))
}

pub(super) async fn get_workshop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workshop>, ServerError> {
    Ok(Json(state.workshops.get(&id).await?))
}

/// Same list as the public one, for the admin dashboard
pub(super) async fn list_admin_workshops(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Workshop>>, ServerError> {
    Ok(Json(state.workshops.list().await?))
}

pub(super) async fn workshop_stream(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> impl IntoResponse {
    change_stream(state.workshops.subscribe())
}

pub(super) async fn create_workshop(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    JsonExtractor(input): JsonExtractor<WorkshopInput>,
) -> Result<impl IntoResponse, ServerError> {
    let workshop = state.workshops.create(input).await?;
    Ok((StatusCode::CREATED, Json(workshop)))
}

pub(super) async fn register_for_workshop(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let registration = state.workshops.register(&id, &identity).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

pub(super) async fn registration_status(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<RegistrationStatus>, ServerError> {
    // Unknown workshops are 404, not "not registered"
    state.workshops.get(&id).await?;
    let registered = state.workshops.is_registered(&id, &identity.uid).await?;
    Ok(Json(RegistrationStatus { registered }))
}

pub(super) async fn list_registrations(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Registration>>, ServerError> {
    Ok(Json(state.workshops.registrations(&id).await?))
}

pub(super) async fn registration_stream(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    state.workshops.get(&id).await?;
    Ok(change_stream(state.workshops.subscribe_registrations(&id)))
}

// =============================================================================
// Enquiries
// =============================================================================

/// Public form; a signed-in caller's uid is attached when the form omits one
pub(super) async fn submit_enquiry(
    State(state): State<AppState>,
    Session(session): Session,
    JsonExtractor(mut input): JsonExtractor<EnquiryInput>,
) -> Result<impl IntoResponse, ServerError> {
    if input.user_id.is_none() {
        input.user_id = signed_in_uid(&session);
    }

    let enquiry = state.enquiries.submit(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(EnquiryReceipt {
            success: true,
            id: enquiry.id,
            school_name: enquiry.school_name,
        }),
    ))
}

fn signed_in_uid(session: &AuthSession) -> Option<String> {
    session.identity().map(|identity| identity.uid.clone())
}

pub(super) async fn list_enquiries(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Enquiry>>, ServerError> {
    Ok(Json(state.enquiries.list().await?))
}

pub(super) async fn enquiry_stream(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> impl IntoResponse {
    change_stream(state.enquiries.subscribe())
}

pub(super) async fn update_enquiry_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    JsonExtractor(payload): JsonExtractor<StatusUpdateRequest>,
) -> Result<Json<Enquiry>, ServerError> {
    Ok(Json(state.enquiries.set_status(&id, payload.status).await?))
}

// =============================================================================
// Search
// =============================================================================

pub(super) async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = state.search.search(&query.q).into_iter().cloned().collect();
    Json(SearchResponse {
        query: query.q,
        results,
    })
}
