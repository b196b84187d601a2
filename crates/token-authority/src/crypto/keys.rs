//! RSA signing key resolution.
//!
//! The authority signs with exactly one RSA key pair, resolved once at
//! startup. Resolution is an ordered pipeline of fallible steps
//! ([`KeyPair::load`]); any [`KeyLoadError`] falls through to generating an
//! ephemeral key ([`resolve_key_pair`]). Only generation failure is fatal.
//!
//! The key id (`kid`) is the SHA-1 thumbprint of the DER-encoded
//! SubjectPublicKeyInfo, base64url without padding. It is computed once per
//! key pair so the token header and the JWKS entry always agree.

use crate::config::KeySource;
use crate::errors::AuthorityError;
use crate::observability::metrics::record_key_resolution;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::EncodingKey;
use pkcs8::der::pem;
use rand::rngs::OsRng;
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use thiserror::Error;
use tracing::instrument;

const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Reasons a configured key pair could not be used.
///
/// Every variant is recoverable: the caller generates a fallback key.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("No private key path configured")]
    NotConfigured,

    #[error("Failed to read private key file {path}: {source}")]
    ReadPrivateKey {
        path: String,
        source: std::io::Error,
    },

    #[error("Private key is not valid PEM: {0}")]
    InvalidPrivatePem(String),

    #[error("Private key is encrypted but no passphrase is configured")]
    PassphraseRequired,

    #[error("Failed to decrypt private key: {0}")]
    DecryptPrivateKey(String),

    #[error("Private key is neither PKCS#1 nor PKCS#8 RSA")]
    ParsePrivateKey,

    #[error("No public key path configured")]
    PublicKeyNotConfigured,

    #[error("Failed to read public key file {path}: {source}")]
    ReadPublicKey {
        path: String,
        source: std::io::Error,
    },

    #[error("Public key is not valid PEM: {0}")]
    InvalidPublicPem(String),

    #[error("Unexpected public key PEM type: {0}")]
    UnexpectedPublicLabel(String),

    #[error("Public key is neither SubjectPublicKeyInfo nor PKCS#1 RSA")]
    ParsePublicKey,

    #[error("Public key does not match private key")]
    PublicKeyMismatch,

    #[error("Failed to encode key material: {0}")]
    Encoding(String),
}

/// How the active key pair came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Loaded,
    Generated,
}

impl KeyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOrigin::Loaded => "loaded",
            KeyOrigin::Generated => "generated",
        }
    }
}

/// A private key as it was found on disk, before canonicalization.
enum ParsedPrivateKey {
    Pkcs1(RsaPrivateKey),
    Pkcs8(RsaPrivateKey),
}

impl ParsedPrivateKey {
    fn format(&self) -> &'static str {
        match self {
            ParsedPrivateKey::Pkcs1(_) => "pkcs1",
            ParsedPrivateKey::Pkcs8(_) => "pkcs8",
        }
    }

    fn into_key(self) -> RsaPrivateKey {
        match self {
            ParsedPrivateKey::Pkcs1(key) | ParsedPrivateKey::Pkcs8(key) => key,
        }
    }
}

/// The authority's RSA signing key pair.
///
/// Immutable once built. The public key always matches the private key.
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    thumbprint: String,
    origin: KeyOrigin,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("thumbprint", &self.thumbprint)
            .field("origin", &self.origin)
            .finish()
    }
}

impl KeyPair {
    fn from_private_key(
        private_key: RsaPrivateKey,
        origin: KeyOrigin,
    ) -> Result<Self, KeyLoadError> {
        let public_key = private_key.to_public_key();

        let pkcs1_der = private_key
            .to_pkcs1_der()
            .map_err(|e| KeyLoadError::Encoding(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_der(pkcs1_der.as_bytes());

        let thumbprint = thumbprint(&public_key)?;

        Ok(Self {
            private_key,
            public_key,
            encoding_key,
            thumbprint,
            origin,
        })
    }

    /// Build a key pair from PEM-encoded private and public keys.
    ///
    /// The private key may be PKCS#1 (`RSA PRIVATE KEY`), PKCS#8
    /// (`PRIVATE KEY`), or encrypted PKCS#8 (`ENCRYPTED PRIVATE KEY`, which
    /// needs `passphrase`). The public key may be SubjectPublicKeyInfo
    /// (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) and must match.
    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        passphrase: Option<&SecretString>,
    ) -> Result<Self, KeyLoadError> {
        let parsed = parse_private_key(private_pem, passphrase)?;
        tracing::debug!(target: "authority.crypto", format = parsed.format(), "Parsed private key");
        let private_key = parsed.into_key();

        let public_key = parse_public_key(public_pem)?;
        if private_key.to_public_key() != public_key {
            return Err(KeyLoadError::PublicKeyMismatch);
        }

        Self::from_private_key(private_key, KeyOrigin::Loaded)
    }

    /// Load the key pair named by `source` from disk.
    #[instrument(skip_all)]
    pub fn load(source: &KeySource) -> Result<Self, KeyLoadError> {
        let private_path = source
            .private_key_path
            .as_deref()
            .ok_or(KeyLoadError::NotConfigured)?;

        let private_pem =
            std::fs::read(private_path).map_err(|source| KeyLoadError::ReadPrivateKey {
                path: private_path.to_string(),
                source,
            })?;

        let public_path = source
            .public_key_path
            .as_deref()
            .ok_or(KeyLoadError::PublicKeyNotConfigured)?;

        let public_pem =
            std::fs::read(public_path).map_err(|source| KeyLoadError::ReadPublicKey {
                path: public_path.to_string(),
                source,
            })?;

        Self::from_pem(
            &private_pem,
            &public_pem,
            source.private_key_passphrase.as_ref(),
        )
    }

    /// Generate a fresh key pair with a `bits`-bit modulus.
    #[instrument(skip_all, fields(bits = bits))]
    pub fn generate(bits: usize) -> Result<Self, AuthorityError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| AuthorityError::Crypto(format!("RSA key generation failed: {}", e)))?;

        Self::from_private_key(private_key, KeyOrigin::Generated)
            .map_err(|e| AuthorityError::Crypto(e.to_string()))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Key used by `jsonwebtoken` to sign RS256 tokens.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Key id shared by token headers and the JWKS entry.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }
}

/// Resolve the signing key pair, generating one when the configured keys
/// are unusable.
///
/// # Errors
///
/// Only fails when fallback generation fails.
#[instrument(skip_all)]
pub fn resolve_key_pair(source: &KeySource) -> Result<KeyPair, AuthorityError> {
    let key_pair = match KeyPair::load(source) {
        Ok(key_pair) => {
            tracing::info!(
                target: "authority.crypto",
                kid = %key_pair.thumbprint(),
                "Loaded RSA signing key"
            );
            key_pair
        }
        Err(reason) => {
            tracing::warn!(
                target: "authority.crypto",
                reason = %reason,
                bits = source.fallback_key_bits,
                "Configured signing key unusable, generating ephemeral key; \
                 tokens will not survive a restart"
            );
            let key_pair = KeyPair::generate(source.fallback_key_bits)?;
            tracing::info!(
                target: "authority.crypto",
                kid = %key_pair.thumbprint(),
                "Generated ephemeral RSA signing key"
            );
            key_pair
        }
    };

    record_key_resolution(key_pair.origin().as_str());
    Ok(key_pair)
}

/// SHA-1 thumbprint of the public key's SubjectPublicKeyInfo DER,
/// base64url without padding.
pub fn thumbprint(public_key: &RsaPublicKey) -> Result<String, KeyLoadError> {
    let spki = public_key
        .to_public_key_der()
        .map_err(|e| KeyLoadError::Encoding(e.to_string()))?;
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, spki.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hash.as_ref()))
}

fn parse_private_key(
    pem_bytes: &[u8],
    passphrase: Option<&SecretString>,
) -> Result<ParsedPrivateKey, KeyLoadError> {
    let (label, der) =
        pem::decode_vec(pem_bytes).map_err(|e| KeyLoadError::InvalidPrivatePem(e.to_string()))?;

    if !label.contains("PRIVATE KEY") {
        tracing::warn!(
            target: "authority.crypto",
            label = label,
            "Private key PEM has unexpected type, attempting to parse anyway"
        );
    }

    if label == ENCRYPTED_PRIVATE_KEY_LABEL {
        let passphrase = passphrase.ok_or(KeyLoadError::PassphraseRequired)?;
        let key = RsaPrivateKey::from_pkcs8_encrypted_der(
            &der,
            passphrase.expose_secret().as_bytes(),
        )
        .map_err(|e| KeyLoadError::DecryptPrivateKey(e.to_string()))?;
        return Ok(ParsedPrivateKey::Pkcs8(key));
    }

    if passphrase.is_some() {
        tracing::debug!(
            target: "authority.crypto",
            "Private key is not encrypted, ignoring configured passphrase"
        );
    }

    RsaPrivateKey::from_pkcs1_der(&der)
        .map(ParsedPrivateKey::Pkcs1)
        .or_else(|_| RsaPrivateKey::from_pkcs8_der(&der).map(ParsedPrivateKey::Pkcs8))
        .map_err(|_| KeyLoadError::ParsePrivateKey)
}

fn parse_public_key(pem_bytes: &[u8]) -> Result<RsaPublicKey, KeyLoadError> {
    let (label, der) =
        pem::decode_vec(pem_bytes).map_err(|e| KeyLoadError::InvalidPublicPem(e.to_string()))?;

    if !label.contains("PUBLIC KEY") {
        return Err(KeyLoadError::UnexpectedPublicLabel(label.to_string()));
    }

    RsaPublicKey::from_public_key_der(&der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
        .map_err(|_| KeyLoadError::ParsePublicKey)
}
