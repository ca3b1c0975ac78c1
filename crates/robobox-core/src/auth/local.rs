//! In-process identity provider

use super::error::{AuthError, AuthResult};
use super::federated::{FederatedVerifier, RejectAllVerifier};
use super::provider::{FederatedAssertion, IdentityProvider, SignedIn};
use super::{Identity, PASSWORD_PROVIDER, PHONE_PROVIDER};
use crate::validation::is_valid_email;
use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Digits in a one-time code
pub const OTP_LEN: usize = 6;

/// How long a one-time code stays valid
pub const OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// Wrong codes tolerated before a pending code is discarded
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Delivery channel for one-time codes
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> AuthResult<()>;
}

#[async_trait]
impl<T: OtpSender + ?Sized> OtpSender for Arc<T> {
    async fn send(&self, phone: &str, code: &str) -> AuthResult<()> {
        (**self).send(phone, code).await
    }
}

/// Writes codes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOtpSender;

#[async_trait]
impl OtpSender for TracingOtpSender {
    async fn send(&self, phone: &str, code: &str) -> AuthResult<()> {
        info!("Verification code for {}: {}", phone, code);
        Ok(())
    }
}

/// Keeps the last code sent to each number
#[derive(Debug, Default)]
pub struct MemoryOtpSender {
    sent: Mutex<HashMap<String, String>>,
}

impl MemoryOtpSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last code sent to `phone`, in normalized form
    pub fn last_code(&self, phone: &str) -> Option<String> {
        let phone = normalize_phone(phone).ok()?;
        self.sent.lock().ok()?.get(&phone).cloned()
    }
}

#[async_trait]
impl OtpSender for MemoryOtpSender {
    async fn send(&self, phone: &str, code: &str) -> AuthResult<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| AuthError::DeliveryFailed(e.to_string()))?;
        sent.insert(phone.to_string(), code.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PasswordAccount {
    uid: String,
    salt: String,
    digest: String,
}

#[derive(Debug, Clone)]
struct PendingOtp {
    code: String,
    expires_at: Instant,
    failures: u32,
}

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<String, Identity>,
    /// Lowercased email -> account
    passwords: HashMap<String, PasswordAccount>,
    /// (provider, subject) -> uid
    federated: HashMap<(String, String), String>,
    /// Normalized phone -> uid
    phones: HashMap<String, String>,
    otps: HashMap<String, PendingOtp>,
    /// Token -> uid
    sessions: HashMap<String, String>,
}

impl Directory {
    fn issue_token(&mut self, uid: &str) -> AuthResult<SignedIn> {
        let identity = self
            .users
            .get(uid)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), uid.to_string());
        Ok(SignedIn { token, identity })
    }
}

/// Identity provider backed by in-process maps
///
/// Passwords are stored as salted SHA-256 digests. Nothing survives a restart.
pub struct LocalIdentityProvider {
    directory: RwLock<Directory>,
    sender: Box<dyn OtpSender>,
    verifier: Box<dyn FederatedVerifier>,
    otp_ttl: Duration,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::with_sender(Box::new(TracingOtpSender))
    }

    pub fn with_sender(sender: Box<dyn OtpSender>) -> Self {
        Self {
            directory: RwLock::new(Directory::default()),
            sender,
            verifier: Box::new(RejectAllVerifier),
            otp_ttl: OTP_TTL,
        }
    }

    /// Accept federated assertions that pass `verifier`
    pub fn with_federated_verifier(mut self, verifier: Box<dyn FederatedVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_otp_ttl(mut self, ttl: Duration) -> Self {
        self.otp_ttl = ttl;
        self
    }

    /// Number of known accounts
    pub async fn user_count(&self) -> usize {
        self.directory.read().await.users.len()
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignedIn> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let mut dir = self.directory.write().await;
        if dir.passwords.contains_key(&email) {
            return Err(AuthError::EmailInUse(email));
        }

        let uid = Uuid::new_v4().to_string();
        let salt = hex::encode(rand::thread_rng().gen::<[u8; 16]>());
        let digest = hash_password(&salt, password);

        dir.users.insert(
            uid.clone(),
            Identity {
                uid: uid.clone(),
                email: Some(email.clone()),
                email_verified: false,
                phone: None,
                display_name: None,
                provider: PASSWORD_PROVIDER.to_string(),
            },
        );
        dir.passwords.insert(
            email.clone(),
            PasswordAccount {
                uid: uid.clone(),
                salt,
                digest,
            },
        );

        info!("Created account {} for {}", uid, email);
        dir.issue_token(&uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<SignedIn> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut dir = self.directory.write().await;
        let account = dir
            .passwords
            .get(&email)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if hash_password(&account.salt, password) != account.digest {
            debug!("Password mismatch for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        dir.issue_token(&account.uid)
    }

    async fn sign_in_federated(&self, assertion: &FederatedAssertion) -> AuthResult<SignedIn> {
        let provider = assertion.provider.trim();
        let subject = assertion.subject.trim();
        if provider.is_empty() || subject.is_empty() {
            return Err(AuthError::InvalidAssertion(
                "provider and subject are required".to_string(),
            ));
        }
        if provider == PASSWORD_PROVIDER || provider == PHONE_PROVIDER {
            return Err(AuthError::InvalidAssertion(format!(
                "provider id {} is reserved",
                provider
            )));
        }
        self.verifier.verify(assertion).await?;
        let email = match assertion.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => Some(
                normalize_email(email)
                    .map_err(|_| AuthError::InvalidAssertion(format!("bad email {}", email)))?,
            ),
            None => None,
        };
        let email_verified = email.is_some() && assertion.email_verified;

        let key = (provider.to_string(), subject.to_string());
        let mut dir = self.directory.write().await;

        let uid = match dir.federated.get(&key).cloned() {
            Some(uid) => {
                // Claims may have changed at the provider since the last sign-in
                if let Some(user) = dir.users.get_mut(&uid) {
                    if email.is_some() {
                        user.email = email;
                        user.email_verified = email_verified;
                    }
                    if assertion.display_name.is_some() {
                        user.display_name = assertion.display_name.clone();
                    }
                }
                uid
            }
            None => {
                let uid = Uuid::new_v4().to_string();
                dir.users.insert(
                    uid.clone(),
                    Identity {
                        uid: uid.clone(),
                        email,
                        email_verified,
                        phone: None,
                        display_name: assertion.display_name.clone(),
                        provider: provider.to_string(),
                    },
                );
                dir.federated.insert(key, uid.clone());
                info!("Linked {} subject {} to {}", provider, subject, uid);
                uid
            }
        };

        dir.issue_token(&uid)
    }

    async fn request_otp(&self, phone: &str) -> AuthResult<()> {
        let phone = normalize_phone(phone)?;
        let code = format!(
            "{:0width$}",
            rand::thread_rng().gen_range(0..1_000_000u32),
            width = OTP_LEN
        );

        // Deliver before storing so a failed send leaves no usable code behind
        self.sender.send(&phone, &code).await?;

        let mut dir = self.directory.write().await;
        dir.otps.insert(
            phone.clone(),
            PendingOtp {
                code,
                expires_at: Instant::now() + self.otp_ttl,
                failures: 0,
            },
        );
        debug!("Issued verification code for {}", phone);
        Ok(())
    }

    async fn verify_otp(&self, phone: &str, code: &str) -> AuthResult<SignedIn> {
        let phone = normalize_phone(phone)?;
        let mut dir = self.directory.write().await;

        let pending = dir
            .otps
            .get(&phone)
            .cloned()
            .ok_or(AuthError::OtpNotRequested)?;

        if Instant::now() >= pending.expires_at {
            dir.otps.remove(&phone);
            return Err(AuthError::OtpExpired);
        }
        if pending.code != code.trim() {
            let failures = pending.failures + 1;
            if failures >= MAX_OTP_ATTEMPTS {
                dir.otps.remove(&phone);
                warn!("Discarded verification code for {} after {} wrong tries", phone, failures);
                return Err(AuthError::TooManyAttempts);
            }
            if let Some(entry) = dir.otps.get_mut(&phone) {
                entry.failures = failures;
            }
            return Err(AuthError::OtpMismatch);
        }
        dir.otps.remove(&phone);

        let uid = match dir.phones.get(&phone).cloned() {
            Some(uid) => uid,
            None => {
                let uid = Uuid::new_v4().to_string();
                dir.users.insert(
                    uid.clone(),
                    Identity {
                        uid: uid.clone(),
                        email: None,
                        email_verified: false,
                        phone: Some(phone.clone()),
                        display_name: None,
                        provider: PHONE_PROVIDER.to_string(),
                    },
                );
                dir.phones.insert(phone.clone(), uid.clone());
                info!("Created phone account {}", uid);
                uid
            }
        };

        dir.issue_token(&uid)
    }

    async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let mut dir = self.directory.write().await;
        if dir.sessions.remove(token).is_some() {
            debug!("Session ended");
        }
        Ok(())
    }

    async fn resolve(&self, token: &str) -> AuthResult<Option<Identity>> {
        let dir = self.directory.read().await;
        Ok(dir
            .sessions
            .get(token)
            .and_then(|uid| dir.users.get(uid))
            .cloned())
    }

    fn name(&self) -> &str {
        "local"
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    Ok(email.to_lowercase())
}

/// Strip separators; keep an optional leading `+` and 10 to 15 digits
fn normalize_phone(phone: &str) -> AuthResult<String> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return Err(AuthError::InvalidPhone(trimmed.to_string())),
        }
    }

    if !(10..=15).contains(&digits.len()) {
        return Err(AuthError::InvalidPhone(trimmed.to_string()));
    }
    Ok(format!("{}{}", plus, digits))
}
