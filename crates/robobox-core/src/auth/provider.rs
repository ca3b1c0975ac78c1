//! Identity provider trait

use super::error::AuthResult;
use super::Identity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of any successful sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedIn {
    /// Opaque bearer token
    pub token: String,
    pub identity: Identity,
}

/// Claims handed over by an external identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedAssertion {
    /// Provider id, e.g. `google.com`
    pub provider: String,
    /// Stable subject id at that provider
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the provider confirmed the email belongs to the subject
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Proof checked by the configured `FederatedVerifier`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Identity provider
///
/// All sign-in operations return a fresh token. `resolve` maps a token back
/// to its identity, `None` when the token is unknown or signed out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignedIn>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<SignedIn>;

    /// Sign in with an assertion from an external provider
    async fn sign_in_federated(&self, assertion: &FederatedAssertion) -> AuthResult<SignedIn>;

    /// Send a one-time code to a phone number
    async fn request_otp(&self, phone: &str) -> AuthResult<()>;

    async fn verify_otp(&self, phone: &str, code: &str) -> AuthResult<SignedIn>;

    async fn sign_out(&self, token: &str) -> AuthResult<()>;

    async fn resolve(&self, token: &str) -> AuthResult<Option<Identity>>;

    /// Provider name
    fn name(&self) -> &str;
}
