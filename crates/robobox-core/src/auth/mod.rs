//! Identity, sign-in flows and admin routing
//!
//! The identity provider is a trait seam ([`IdentityProvider`]); the crate
//! ships [`LocalIdentityProvider`] for development and tests. Callers carry
//! an explicit [`AuthSession`] instead of reading a global "current user".

mod error;
mod federated;
mod local;
mod provider;
mod session;

pub use error::{AuthError, AuthResult};
pub use federated::{FederatedVerifier, RejectAllVerifier, SharedSecretVerifier};
pub use local::{
    LocalIdentityProvider, MemoryOtpSender, OtpSender, TracingOtpSender, MAX_OTP_ATTEMPTS,
    MIN_PASSWORD_LEN, OTP_LEN, OTP_TTL,
};
pub use provider::{FederatedAssertion, IdentityProvider, SignedIn};
pub use session::{AuthSession, AuthState};

use serde::{Deserialize, Serialize};

/// Email given admin access when nothing else is configured
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Landing route for the admin identity
pub const ADMIN_LANDING: &str = "/admin";

/// Landing route for everyone else
pub const HOME_LANDING: &str = "/";

/// Provider id of email/password accounts
pub const PASSWORD_PROVIDER: &str = "password";

/// Provider id of phone accounts
pub const PHONE_PROVIDER: &str = "phone";

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Set only when a federated provider vouched for the email
    #[serde(default)]
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Sign-in method: `password`, `phone`, or the federated provider id
    pub provider: String,
}

impl Identity {
    /// Name shown on registrations: display name, else email, else phone
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.email.clone())
            .or_else(|| self.phone.clone())
            .unwrap_or_else(|| self.uid.clone())
    }
}

/// Single-identity admin rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    admin_email: String,
}

impl AdminPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into().trim().to_string(),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// The admin email held by a password account, or vouched for by a
    /// federated provider
    pub fn is_admin(&self, identity: &Identity) -> bool {
        let trusted = identity.provider == PASSWORD_PROVIDER || identity.email_verified;
        trusted
            && identity
                .email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(&self.admin_email))
    }

    /// Where to send an identity right after sign-in
    pub fn landing(&self, identity: &Identity) -> &'static str {
        if self.is_admin(identity) {
            ADMIN_LANDING
        } else {
            HOME_LANDING
        }
    }
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL)
    }
}
