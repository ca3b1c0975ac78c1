//! Router creation and configuration
//!
//! Creates the Axum router for all REST API endpoints.

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(state: AppState) -> Router {
    let reveal = Router::new()
        .route("/", post(create_reveal))
        .route("/:id", get(get_reveal).delete(delete_reveal))
        .route("/:id/pointer", post(reveal_pointer))
        .route("/:id/reveal", post(reveal_instantly))
        .route("/:id/retry", post(retry_reveal))
        .route("/:id/copy", post(copy_code));

    let auth = Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/federated", post(sign_in_federated))
        .route("/otp/request", post(request_otp))
        .route("/otp/verify", post(verify_otp))
        .route("/sign-out", post(sign_out))
        .route("/me", get(me));

    let admin = Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/workshops", get(list_admin_workshops).post(create_workshop))
        .route("/workshops/stream", get(workshop_stream))
        .route("/workshops/:id/registrations", get(list_registrations))
        .route("/workshops/:id/registrations/stream", get(registration_stream))
        .route("/enquiries", get(list_enquiries))
        .route("/enquiries/stream", get(enquiry_stream))
        .route("/enquiries/:id", patch(update_enquiry_status));

    Router::new()
        .route("/health", get(health))
        .route("/v1/faq", post(ask_faq))
        .route("/v1/products", get(list_products))
        .route("/v1/products/stream", get(product_stream))
        .route("/v1/products/:id", get(get_product))
        .route("/v1/workshops", get(list_workshops))
        .route("/v1/workshops/:id", get(get_workshop))
        .route(
            "/v1/workshops/:id/registration",
            post(register_for_workshop).get(registration_status),
        )
        .route("/v1/enquiries", post(submit_enquiry))
        .route("/v1/search", get(search))
        .nest("/v1/reveal", reveal)
        .nest("/v1/auth", auth)
        .nest("/v1/admin", admin)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
