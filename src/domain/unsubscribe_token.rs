use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Capability that authorises unsubscribing one email address without login.
///
/// The token is `hex(sha256(email || secret))`: no nonce and no expiry, so it
/// only changes when the server secret is rotated. A rotation silently
/// invalidates every link already sent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnsubscribeToken(String);

impl UnsubscribeToken {
    pub fn generate(email: &str, secret: &Secret<String>) -> UnsubscribeToken {
        let mut hasher = Sha256::new();
        hasher.update(email.as_bytes());
        hasher.update(secret.expose_secret().as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    /// Recomputes the expected token; whatever was stored alongside the
    /// subscriber is never consulted. Compared in constant time.
    pub fn verify(email: &str, supplied: &str, secret: &Secret<String>) -> bool {
        let expected = Self::generate(email, secret);

        expected.0.as_bytes().ct_eq(supplied.as_bytes()).into()
    }
}

impl AsRef<str> for UnsubscribeToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnsubscribeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
