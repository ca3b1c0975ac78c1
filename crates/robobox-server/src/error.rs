//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use robobox_core::auth::AuthError;
use robobox_llm::LLMError;
use robobox_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Server error type
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or unknown bearer token
    #[error("Sign-in required")]
    Unauthenticated,

    /// Signed in, but not as the admin
    #[error("Admin access required")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Write conflicts with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The model provider failed or returned unusable output
    #[error("Generation failed: {0}")]
    Upstream(String),

    /// The model provider did not answer in time
    #[error("Generation timed out: {0}")]
    Timeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<LLMError> for ServerError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Timeout(_) => ServerError::Timeout(err.to_string()),
            LLMError::Other(msg) | LLMError::InvalidConfiguration(msg) => {
                ServerError::InternalError(msg)
            }
            other => ServerError::Upstream(other.to_string()),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ServerError::NotFound(err.to_string()),
            StoreError::AlreadyExists { .. } | StoreError::AlreadyRegistered { .. } => {
                ServerError::Conflict(err.to_string())
            }
            StoreError::Validation(_) | StoreError::InvalidCollection { .. } => {
                ServerError::InvalidRequest(err.to_string())
            }
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated
            | AuthError::InvalidCredentials
            | AuthError::OtpExpired
            | AuthError::OtpMismatch
            | AuthError::TooManyAttempts
            | AuthError::UnverifiedAssertion(_) => ServerError::Unauthenticated,
            AuthError::Forbidden => ServerError::Forbidden,
            AuthError::EmailInUse(_) => ServerError::Conflict(err.to_string()),
            AuthError::DeliveryFailed(_) => ServerError::Upstream(err.to_string()),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}
