//! Access token claims and verification for relying parties.
//!
//! Tokens issued by the authority are RS256 JWTs whose header `kid` equals
//! the thumbprint published as `kid`/`x5t` in the JWKS document. A verifier
//! picks the JWK by `kid`, rebuilds the RSA key from `n`/`e`, and checks the
//! signature, expiry, and (optionally) issuer and audience.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only RS256 is accepted
//! - Error messages are generic; details go to debug logs
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::verify_access_token;
//!
//! let jwks: Jwks = http_client.get(jwks_url).send().await?.json().await?;
//! let claims = verify_access_token(&token, &jwks, Some("issuer"), Some("api"))?;
//! if claims.admin { /* ... */ }
//! ```

use crate::jwks::Jwks;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// A 4096-bit RS256 signature alone is ~683 base64url characters; typical
/// tokens from this authority are under 1KB. Larger inputs are rejected
/// before any base64 decoding or signature work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default clock skew tolerance for `iat` validation (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Signing algorithm of every issued token.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during token verification.
///
/// All variants share one message so a caller cannot tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a three-part JWT or its header is not JSON.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token header has no usable `kid`.
    #[error("The access token is invalid or expired")]
    MissingKid,

    /// No JWK in the key set matches the token's `kid`.
    #[error("The access token is invalid or expired")]
    UnknownKid,

    /// Signature, expiry, issuer, or audience check failed.
    #[error("The access token is invalid or expired")]
    InvalidToken,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Claims carried by an access token.
///
/// `aud` is omitted when the grant request named no audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer identity of the authority.
    pub iss: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Audience requested by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Scope string configured for the client.
    pub scope: String,

    /// Whether the client is an administrator.
    pub admin: bool,
}

impl AccessTokenClaims {
    /// Check if the token has a specific scope.
    ///
    /// Scopes are space-separated.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the `kid` from a JWT header without verifying the signature.
///
/// SECURITY NOTE: the token is NOT validated here. The `kid` only selects
/// which JWK to verify with.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` if the token is not three parts or the header is not JSON
/// - `MissingKid` if the header has no non-empty string `kid`
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtValidationError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)
}

/// Verify an access token against a JWKS document.
///
/// The JWK is selected by the token's `kid`. `issuer` and `audience` are
/// checked only when given.
///
/// # Errors
///
/// Any failure maps to a `JwtValidationError`; see [`extract_kid`] for the
/// header errors. `UnknownKid` if no key matches, `InvalidToken` for a bad
/// signature, expired token, or issuer/audience mismatch, and
/// `IatTooFarInFuture` if `iat` exceeds the clock skew tolerance.
pub fn verify_access_token(
    token: &str,
    jwks: &Jwks,
    issuer: Option<&str>,
    audience: Option<&str>,
) -> Result<AccessTokenClaims, JwtValidationError> {
    let kid = extract_kid(token)?;

    let jwk = jwks.find(&kid).ok_or_else(|| {
        tracing::debug!(target: "common.jwt", "Token rejected: kid not in key set");
        JwtValidationError::UnknownKid
    })?;

    let decoding_key = jwk
        .decoding_key()
        .map_err(|_| JwtValidationError::InvalidToken)?;

    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = true;
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    if let Some(iss) = issuer {
        validation.set_issuer(&[iss]);
    }

    let token_data =
        decode::<AccessTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
            JwtValidationError::InvalidToken
        })?;

    validate_iat(token_data.claims.iat, DEFAULT_CLOCK_SKEW)?;

    Ok(token_data.claims)
}

/// Validate the `iat` claim against the current time.
///
/// # Errors
///
/// Returns `IatTooFarInFuture` if `iat` is more than `clock_skew` ahead of now.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    validate_iat_at(iat, clock_skew, chrono::Utc::now().timestamp())
}

/// Deterministic `iat` validation against an explicit `now`.
///
/// # Errors
///
/// Returns `IatTooFarInFuture` if `iat` is more than `clock_skew` after `now`.
pub fn validate_iat_at(iat: i64, clock_skew: Duration, now: i64) -> Result<(), JwtValidationError> {
    let skew = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);
    let max_iat = now.saturating_add(skew);

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}
