//! Explicit auth session context

use super::error::{AuthError, AuthResult};
use super::provider::{IdentityProvider, SignedIn};
use super::{AdminPolicy, Identity};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Token not checked yet
    Loading,
    /// Token checked; `None` means anonymous
    Ready(Option<Identity>),
    SignedOut,
}

/// Auth context handed to whoever needs the current identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    state: AuthState,
    token: Option<String>,
}

impl AuthSession {
    pub fn loading() -> Self {
        Self {
            state: AuthState::Loading,
            token: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            state: AuthState::Ready(None),
            token: None,
        }
    }

    pub fn signed_in(signed: SignedIn) -> Self {
        Self {
            state: AuthState::Ready(Some(signed.identity)),
            token: Some(signed.token),
        }
    }

    /// Resolve a bearer token into a ready session
    ///
    /// Unknown tokens yield an anonymous session rather than an error.
    pub async fn restore(provider: &dyn IdentityProvider, token: Option<&str>) -> AuthResult<Self> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Self::anonymous());
        };

        match provider.resolve(token).await? {
            Some(identity) => Ok(Self {
                state: AuthState::Ready(Some(identity)),
                token: Some(token.to_string()),
            }),
            None => Ok(Self::anonymous()),
        }
    }

    pub async fn sign_out(&mut self, provider: &dyn IdentityProvider) -> AuthResult<()> {
        if let Some(token) = self.token.take() {
            provider.sign_out(&token).await?;
        }
        self.state = AuthState::SignedOut;
        Ok(())
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == AuthState::Loading
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            AuthState::Ready(identity) => identity.as_ref(),
            _ => None,
        }
    }

    pub fn require_identity(&self) -> AuthResult<&Identity> {
        self.identity().ok_or(AuthError::Unauthenticated)
    }

    /// The admin identity, `Unauthenticated` when anonymous, `Forbidden` otherwise
    pub fn require_admin(&self, policy: &AdminPolicy) -> AuthResult<&Identity> {
        let identity = self.require_identity()?;
        if policy.is_admin(identity) {
            Ok(identity)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::loading()
    }
}
