//! Verification of federated sign-in assertions

use super::error::{AuthError, AuthResult};
use super::provider::FederatedAssertion;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks that an assertion was issued by the provider it names
#[async_trait]
pub trait FederatedVerifier: Send + Sync {
    async fn verify(&self, assertion: &FederatedAssertion) -> AuthResult<()>;
}

/// Refuses every assertion
///
/// Federated sign-in stays off until a real verifier is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllVerifier;

#[async_trait]
impl FederatedVerifier for RejectAllVerifier {
    async fn verify(&self, assertion: &FederatedAssertion) -> AuthResult<()> {
        Err(AuthError::UnverifiedAssertion(format!(
            "no verifier configured for {}",
            assertion.provider
        )))
    }
}

/// Accepts assertions signed with a shared secret
///
/// The signature is a hex HMAC-SHA256 over provider, subject, email, the
/// email-verified flag and display name. It is produced by a trusted gateway
/// that has already checked the upstream ID token.
pub struct SharedSecretVerifier {
    key: Vec<u8>,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    /// Signature a gateway attaches to `assertion`
    pub fn sign(&self, assertion: &FederatedAssertion) -> AuthResult<String> {
        Ok(hex::encode(self.mac(assertion)?.finalize().into_bytes()))
    }

    fn mac(&self, assertion: &FederatedAssertion) -> AuthResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AuthError::UnverifiedAssertion(e.to_string()))?;
        let verified = if assertion.email_verified { "1" } else { "0" };
        let claims = [
            assertion.provider.as_str(),
            assertion.subject.as_str(),
            assertion.email.as_deref().unwrap_or(""),
            verified,
            assertion.display_name.as_deref().unwrap_or(""),
        ];
        for claim in claims {
            mac.update(claim.as_bytes());
            mac.update(&[0]);
        }
        Ok(mac)
    }
}

#[async_trait]
impl FederatedVerifier for SharedSecretVerifier {
    async fn verify(&self, assertion: &FederatedAssertion) -> AuthResult<()> {
        let signature = assertion
            .signature
            .as_deref()
            .ok_or_else(|| AuthError::UnverifiedAssertion("missing signature".to_string()))?;
        let bytes = hex::decode(signature.trim())
            .map_err(|_| AuthError::UnverifiedAssertion("malformed signature".to_string()))?;

        self.mac(assertion)?
            .verify_slice(&bytes)
            .map_err(|_| AuthError::UnverifiedAssertion("signature mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion() -> FederatedAssertion {
        FederatedAssertion {
            provider: "google.com".to_string(),
            subject: "g-123".to_string(),
            email: Some("kid@gmail.com".to_string()),
            email_verified: true,
            display_name: None,
            signature: None,
        }
    }

    #[tokio::test]
    async fn test_reject_all() {
        assert!(matches!(
            RejectAllVerifier.verify(&assertion()).await,
            Err(AuthError::UnverifiedAssertion(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_assertion_verifies() {
        let verifier = SharedSecretVerifier::new("gateway-secret");
        let mut signed = assertion();
        signed.signature = Some(verifier.sign(&signed).unwrap());
        assert!(verifier.verify(&signed).await.is_ok());
    }

    #[tokio::test]
    async fn test_tampered_claims_fail() {
        let verifier = SharedSecretVerifier::new("gateway-secret");
        let mut signed = assertion();
        signed.signature = Some(verifier.sign(&signed).unwrap());

        let mut tampered = signed.clone();
        tampered.email = Some("admin@example.com".to_string());
        assert!(verifier.verify(&tampered).await.is_err());

        let mut flipped = signed.clone();
        flipped.email_verified = false;
        assert!(verifier.verify(&flipped).await.is_err());

        let other = SharedSecretVerifier::new("another-secret");
        assert!(other.verify(&signed).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_or_malformed_signature() {
        let verifier = SharedSecretVerifier::new("gateway-secret");
        assert!(verifier.verify(&assertion()).await.is_err());

        let mut garbage = assertion();
        garbage.signature = Some("not-hex".to_string());
        assert!(verifier.verify(&garbage).await.is_err());
    }
}
