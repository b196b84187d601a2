//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over issued access tokens. The checks
//! decode the token without verifying its signature; use
//! `common::jwt::verify_access_token` for that.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::jwt::AccessTokenClaims;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

fn decode_segment<T: serde::de::DeserializeOwned>(token: &str, index: usize) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT segment {} JSON: {}", index, e))
}

/// Claims of `token`, decoded without signature verification.
pub fn decode_claims(token: &str) -> AccessTokenClaims {
    decode_segment(token, 1)
}

/// Custom assertions for issued access tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_has_scope("sc")
///     .assert_signed_by(FIXTURE_THUMBPRINT)
///     .assert_admin(false);
/// ```
pub trait TokenAssertions {
    /// Assert a three-part RS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the space-separated scope contains `scope`
    fn assert_has_scope(&self, scope: &str) -> &Self;

    /// Assert the header `kid`
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert `exp - iat`
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    fn assert_admin(&self, expected: bool) -> &Self;

    /// Assert the `aud` claim, `None` meaning absent
    fn assert_audience(&self, expected: Option<&str>) -> &Self;

    fn assert_issuer(&self, issuer: &str) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header: JwtHeader = decode_segment(self, 0);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(header.kid.is_some(), "JWT header must carry a kid");

        // Claims must parse
        let _ = decode_claims(self);
        self
    }

    fn assert_has_scope(&self, scope: &str) -> &Self {
        let claims = decode_claims(self);
        assert!(
            claims.has_scope(scope),
            "Token scope '{}' does not contain '{}'",
            claims.scope,
            scope
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header: JwtHeader = decode_segment(self, 0);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Token was signed by a different key"
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Token lifetime mismatch (iat={}, exp={})",
            claims.iat,
            claims.exp
        );
        self
    }

    fn assert_admin(&self, expected: bool) -> &Self {
        assert_eq!(decode_claims(self).admin, expected, "admin claim mismatch");
        self
    }

    fn assert_audience(&self, expected: Option<&str>) -> &Self {
        assert_eq!(
            decode_claims(self).aud.as_deref(),
            expected,
            "aud claim mismatch"
        );
        self
    }

    fn assert_issuer(&self, issuer: &str) -> &Self {
        assert_eq!(decode_claims(self).iss, issuer, "iss claim mismatch");
        self
    }
}
