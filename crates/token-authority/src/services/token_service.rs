use crate::crypto::{self, KeyPair};
use crate::errors::AuthorityError;
use crate::models::{
    AuthorizationDirectory, TokenRequest, TokenResponse, GRANT_TYPE_CLIENT_CREDENTIALS,
    TOKEN_TYPE_BEARER,
};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issuance;
use chrono::Utc;
use common::jwt::AccessTokenClaims;
use std::time::Instant;
use tracing::instrument;

/// Issue an access token using the OAuth 2.0 Client Credentials flow
///
/// Blocking: runs one bcrypt verification. Async callers should run it on
/// the blocking pool.
#[instrument(skip_all, fields(client = %hash_for_correlation(&request.client_id)))]
pub fn issue_token(
    directory: &AuthorizationDirectory,
    key_pair: &KeyPair,
    lifetime_seconds: i64,
    request: &TokenRequest,
) -> Result<TokenResponse, AuthorityError> {
    let start = Instant::now();
    let result = run_grant(directory, key_pair, lifetime_seconds, request);

    let grant_type = if request.grant_type == GRANT_TYPE_CLIENT_CREDENTIALS {
        GRANT_TYPE_CLIENT_CREDENTIALS
    } else {
        "unsupported"
    };
    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance(grant_type, status, start.elapsed());

    result
}

fn run_grant(
    directory: &AuthorizationDirectory,
    key_pair: &KeyPair,
    lifetime_seconds: i64,
    request: &TokenRequest,
) -> Result<TokenResponse, AuthorityError> {
    if request.grant_type != GRANT_TYPE_CLIENT_CREDENTIALS {
        tracing::debug!(target: "authority.token", "Rejected unsupported grant type");
        return Err(AuthorityError::UnsupportedGrantType);
    }

    let client = directory.find_client(&request.client_id);

    // Always run bcrypt so unknown clients and wrong secrets take comparable time.
    let hash_to_verify = client.map_or(directory.dummy_secret_hash(), |c| {
        c.client_secret_hash.as_str()
    });

    let is_valid = match crypto::verify_client_secret(&request.client_secret, hash_to_verify) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(target: "authority.token", error = %e, "Stored secret hash is unusable");
            false
        }
    };

    let client = match client {
        Some(client) if is_valid => client,
        _ => {
            tracing::debug!(target: "authority.token", "Rejected client credentials");
            return Err(AuthorityError::InvalidCredentials);
        }
    };

    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        iss: directory.issuer.clone(),
        iat: now,
        exp: now + lifetime_seconds,
        aud: Some(request.audience.clone()).filter(|aud| !aud.is_empty()),
        scope: client.scope.clone(),
        admin: client.is_admin,
    };

    let access_token = crypto::sign_access_token(&claims, key_pair)?;

    tracing::info!(
        target: "authority.token",
        kid = %key_pair.thumbprint(),
        admin = client.is_admin,
        "Issued access token"
    );

    Ok(TokenResponse {
        token_type: TOKEN_TYPE_BEARER.to_string(),
        access_token,
        expires_in: lifetime_seconds,
    })
}
