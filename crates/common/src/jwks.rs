//! JSON Web Key Set wire types (RFC 7517).
//!
//! The token authority publishes one [`JsonWebKey`] per active RSA signing
//! key at `/.well-known/jwks.json`. Relying parties deserialize the same
//! types and rebuild a verification key from `n`/`e` with
//! [`JsonWebKey::decoding_key`].

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key type for RSA keys.
pub const KEY_TYPE_RSA: &str = "RSA";

/// Public key use for signature verification.
pub const KEY_USE_SIGNATURE: &str = "sig";

/// Algorithm tag published in the JWKS entry.
///
/// This is the tag existing relying parties already match on. It is not the
/// JWA name; tokens themselves are signed with `RS256`.
pub const KEY_ALGORITHM_TAG: &str = "RSA256";

/// Errors raised while turning a JWK into a verification key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwksError {
    /// The JWK is not an RSA key.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The `n`/`e` components could not be decoded.
    #[error("Invalid RSA key components")]
    InvalidComponents,
}

/// JSON Web Key Set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

impl Jwks {
    /// A key set with no keys.
    ///
    /// Returned when the signing key cannot be encoded so the endpoint
    /// still produces a valid document.
    #[must_use]
    pub fn empty() -> Self {
        Self { keys: Vec::new() }
    }

    /// Find the key with the given `kid`.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// A single RSA public key entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub alg: String,
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub use_: String,
    /// Modulus, base64url without padding.
    pub n: String,
    /// Public exponent, minimal big-endian bytes, base64url without padding.
    pub e: String,
    /// Standard base64 DER of the SubjectPublicKeyInfo.
    pub x5c: Vec<String>,
    pub x5t: String,
}

impl JsonWebKey {
    /// Build a `jsonwebtoken` decoding key from the modulus and exponent.
    ///
    /// # Errors
    ///
    /// Returns `JwksError::UnsupportedKeyType` for non-RSA keys and
    /// `JwksError::InvalidComponents` when `n`/`e` are not valid base64url.
    pub fn decoding_key(&self) -> Result<DecodingKey, JwksError> {
        if self.kty != KEY_TYPE_RSA {
            return Err(JwksError::UnsupportedKeyType(self.kty.clone()));
        }

        DecodingKey::from_rsa_components(&self.n, &self.e).map_err(|e| {
            tracing::debug!(target: "common.jwks", error = %e, "Failed to decode RSA components");
            JwksError::InvalidComponents
        })
    }
}
