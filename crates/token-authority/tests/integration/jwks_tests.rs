//! End-to-end tests for `GET /.well-known/jwks.json`
//!
//! A relying party fetches the key set, picks the key by the token's `kid`,
//! and verifies the signature.

use authority_test_utils::*;
use base64::{engine::general_purpose::STANDARD, Engine};
use common::jwks::Jwks;
use common::jwt::{extract_kid, verify_access_token, JwtValidationError};
use reqwest::StatusCode;
use token_authority::crypto::KeyPair;
use token_authority::models::TokenResponse;

async fn fetch_jwks(server: &TestAuthorityServer) -> Result<Jwks, anyhow::Error> {
    let jwks = reqwest::get(format!("{}/.well-known/jwks.json", server.url()))
        .await?
        .json()
        .await?;
    Ok(jwks)
}

async fn fetch_token(
    server: &TestAuthorityServer,
    client_id: &str,
    client_secret: &str,
    audience: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut builder = TokenRequestBuilder::client_credentials(client_id, client_secret);
    if let Some(audience) = audience {
        builder = builder.with_audience(audience);
    }
    let response: TokenResponse = reqwest::Client::new()
        .post(format!("{}/oauth/token", server.url()))
        .json(&builder.build())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.access_token)
}

#[tokio::test]
async fn test_jwks_publishes_fixture_key() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let response = reqwest::get(format!("{}/.well-known/jwks.json", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("max-age=3600")
    );

    let jwks: Jwks = response.json().await?;
    assert_eq!(jwks.keys.len(), 1);

    let key = jwks
        .find(FIXTURE_THUMBPRINT)
        .ok_or_else(|| anyhow::anyhow!("fixture kid missing from JWKS"))?;
    assert_eq!(key.alg, "RSA256");
    assert_eq!(key.kty, "RSA");
    assert_eq!(key.use_, "sig");
    assert_eq!(key.x5t, FIXTURE_THUMBPRINT);
    assert_eq!(key.n, FIXTURE_MODULUS);
    assert_eq!(key.e, FIXTURE_EXPONENT);
    Ok(())
}

#[tokio::test]
async fn test_jwks_x5c_is_public_key_der() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let jwks = fetch_jwks(&server).await?;
    let key = jwks
        .keys
        .first()
        .ok_or_else(|| anyhow::anyhow!("empty JWKS"))?;
    let x5c = key
        .x5c
        .first()
        .ok_or_else(|| anyhow::anyhow!("empty x5c"))?;

    let pem_body: String = PUBLIC_KEY_PEM
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    assert_eq!(x5c, &pem_body);
    assert!(STANDARD.decode(x5c).is_ok());
    Ok(())
}

#[tokio::test]
async fn test_issued_token_verifies_against_jwks() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let token = fetch_token(&server, TEST_CLIENT_ID, TEST_CLIENT_SECRET, Some(TEST_AUDIENCE)).await?;
    let jwks = fetch_jwks(&server).await?;

    assert_eq!(extract_kid(&token)?, server.thumbprint());

    let claims = verify_access_token(&token, &jwks, Some(TEST_ISSUER), Some(TEST_AUDIENCE))?;
    assert_eq!(claims.scope, TEST_CLIENT_SCOPE);
    assert!(!claims.admin);
    Ok(())
}

#[tokio::test]
async fn test_token_from_other_authority_is_rejected() -> Result<(), anyhow::Error> {
    // Two authorities with different keys
    let trusted = TestAuthorityServer::spawn_default().await?;
    let other = TestAuthorityServer::spawn(
        TestDirectoryBuilder::standard().build(),
        KeyPair::generate(2048)?,
    )
    .await?;
    assert_ne!(trusted.thumbprint(), other.thumbprint());

    let token = fetch_token(&other, TEST_CLIENT_ID, TEST_CLIENT_SECRET, None).await?;
    let trusted_jwks = fetch_jwks(&trusted).await?;

    assert_eq!(
        verify_access_token(&token, &trusted_jwks, None, None),
        Err(JwtValidationError::UnknownKid)
    );
    Ok(())
}

#[tokio::test]
async fn test_generated_key_is_published() -> Result<(), anyhow::Error> {
    let key_pair = KeyPair::generate(2048)?;
    let server =
        TestAuthorityServer::spawn(TestDirectoryBuilder::standard().build(), key_pair).await?;

    let jwks = fetch_jwks(&server).await?;
    let token = fetch_token(&server, TEST_ADMIN_CLIENT_ID, TEST_ADMIN_CLIENT_SECRET, None).await?;

    assert!(jwks.find(server.thumbprint()).is_some());
    let claims = verify_access_token(&token, &jwks, Some(TEST_ISSUER), None)?;
    assert!(claims.admin);
    assert_eq!(claims.aud, None);
    Ok(())
}
