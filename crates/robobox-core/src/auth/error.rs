//! Auth error types

use thiserror::Error;

/// Auth operation result type
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Auth errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("No verification code was requested for this number")]
    OtpNotRequested,

    #[error("Verification code expired")]
    OtpExpired,

    #[error("Verification code does not match")]
    OtpMismatch,

    #[error("Too many wrong codes; request a new one")]
    TooManyAttempts,

    #[error("Invalid federated assertion: {0}")]
    InvalidAssertion(String),

    #[error("Federated assertion not verified: {0}")]
    UnverifiedAssertion(String),

    #[error("Code delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Sign-in required")]
    Unauthenticated,

    #[error("Admin access required")]
    Forbidden,
}

impl AuthError {
    /// Whether the caller's credentials are at fault, as opposed to the request shape
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::OtpExpired
                | AuthError::OtpMismatch
                | AuthError::OtpNotRequested
                | AuthError::TooManyAttempts
                | AuthError::UnverifiedAssertion(_)
                | AuthError::Unauthenticated
        )
    }
}
