pub mod keys;

pub use keys::{resolve_key_pair, KeyLoadError, KeyOrigin, KeyPair};

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST, MIN_CLIENT_SECRET_LENGTH};
use crate::errors::AuthorityError;
use crate::observability::metrics::record_bcrypt_duration;
use common::jwt::{AccessTokenClaims, TOKEN_ALGORITHM};
use jsonwebtoken::{encode, Header};
use std::time::Instant;
use tracing::instrument;

/// Sign access token claims with the authority's RSA key.
///
/// The header carries `kid` = the key pair's thumbprint.
#[instrument(skip_all)]
pub fn sign_access_token(
    claims: &AccessTokenClaims,
    key_pair: &KeyPair,
) -> Result<String, AuthorityError> {
    let mut header = Header::new(TOKEN_ALGORITHM);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_pair.thumbprint().to_string());

    encode(&header, claims, key_pair.encoding_key())
        .map_err(|e| AuthorityError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Hash a client secret with bcrypt for the authorization directory.
///
/// Provisioning only. Enforces the minimum secret length and cost range.
#[instrument(skip_all)]
pub fn hash_client_secret(secret: &str, cost: u32) -> Result<String, AuthorityError> {
    if secret.chars().count() < MIN_CLIENT_SECRET_LENGTH {
        return Err(AuthorityError::Crypto(format!(
            "Client secret must be at least {} characters",
            MIN_CLIENT_SECRET_LENGTH
        )));
    }

    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthorityError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    let start = Instant::now();
    let result = bcrypt::hash(secret, cost)
        .map_err(|e| AuthorityError::Crypto(format!("Secret hashing failed: {}", e)));
    record_bcrypt_duration("hash", start.elapsed());
    result
}

/// Verify a presented client secret against a bcrypt hash.
///
/// Any length of secret is accepted. A malformed hash is an error, which
/// callers treat the same as a mismatch.
#[instrument(skip_all)]
pub fn verify_client_secret(secret: &str, hash: &str) -> Result<bool, AuthorityError> {
    let start = Instant::now();
    let result = bcrypt::verify(secret, hash)
        .map_err(|e| AuthorityError::Crypto(format!("Secret verification failed: {}", e)));
    record_bcrypt_duration("verify", start.elapsed());
    result
}
