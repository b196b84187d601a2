//! End-to-end tests for `POST /oauth/token`
//!
//! Covers the client credentials grant over real HTTP: successful issuance,
//! claim contents, and the two 401 rejections.

use authority_test_utils::*;
use reqwest::StatusCode;
use std::collections::HashMap;
use token_authority::models::{TokenResponse, TOKEN_TYPE_BEARER};

async fn post_token(
    server: &TestAuthorityServer,
    body: &serde_json::Value,
) -> Result<reqwest::Response, anyhow::Error> {
    let response = reqwest::Client::new()
        .post(format!("{}/oauth/token", server.url()))
        .json(body)
        .send()
        .await?;
    Ok(response)
}

// ============================================================================
// Successful issuance
// ============================================================================

#[tokio::test]
async fn test_client_credentials_issues_bearer_token() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthorityServer::spawn_default().await?;
    let body = TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET).build();

    // Act
    let response = post_token(&server, &body).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let token: TokenResponse = response.json().await?;
    assert_eq!(token.token_type, TOKEN_TYPE_BEARER);
    assert_eq!(token.expires_in, 3600);

    token
        .access_token
        .assert_valid_jwt()
        .assert_signed_by(FIXTURE_THUMBPRINT)
        .assert_issuer(TEST_ISSUER)
        .assert_has_scope(TEST_CLIENT_SCOPE)
        .assert_expires_in(3600)
        .assert_admin(false)
        .assert_audience(None);

    Ok(())
}

#[tokio::test]
async fn test_admin_client_and_audience_reach_claims() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;
    let body =
        TokenRequestBuilder::client_credentials(TEST_ADMIN_CLIENT_ID, TEST_ADMIN_CLIENT_SECRET)
            .with_audience(TEST_AUDIENCE)
            .build();

    let response = post_token(&server, &body).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let token: TokenResponse = response.json().await?;
    token
        .access_token
        .assert_admin(true)
        .assert_audience(Some(TEST_AUDIENCE));

    Ok(())
}

#[tokio::test]
async fn test_configured_lifetime_applies() -> Result<(), anyhow::Error> {
    let vars = HashMap::from([("TOKEN_LIFETIME_SECONDS".to_string(), "120".to_string())]);
    let server = TestAuthorityServer::spawn_with_vars(
        TestDirectoryBuilder::standard().build(),
        fixture_key_pair(),
        vars,
    )
    .await?;
    let body = TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET).build();

    let token: TokenResponse = post_token(&server, &body).await?.json().await?;

    assert_eq!(token.expires_in, 120);
    token.access_token.assert_expires_in(120);
    Ok(())
}

#[tokio::test]
async fn test_runtime_hashed_client_authenticates() -> Result<(), anyhow::Error> {
    let directory = TestDirectoryBuilder::new()
        .with_client("reporting", "reporting-secret", "reports:read reports:write", false)
        .build();
    let server = TestAuthorityServer::spawn(directory, fixture_key_pair()).await?;
    let body = TokenRequestBuilder::client_credentials("reporting", "reporting-secret").build();

    let response = post_token(&server, &body).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let token: TokenResponse = response.json().await?;
    token
        .access_token
        .assert_has_scope("reports:read")
        .assert_has_scope("reports:write");
    Ok(())
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_wrong_secret_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;
    let body = TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, "not-the-secret").build();

    let response = post_token(&server, &body).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: serde_json::Value = response.json().await?;
    assert_eq!(error["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn test_unknown_client_matches_wrong_secret_response() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let unknown = post_token(
        &server,
        &TokenRequestBuilder::client_credentials("nobody", TEST_CLIENT_SECRET).build(),
    )
    .await?;
    let wrong = post_token(
        &server,
        &TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, "nope").build(),
    )
    .await?;

    assert_eq!(unknown.status(), wrong.status());
    assert_eq!(unknown.text().await?, wrong.text().await?);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_grant_type() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;
    let body = TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
        .with_grant_type("password")
        .build();

    let response = post_token(&server, &body).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: serde_json::Value = response.json().await?;
    assert_eq!(error["error"], "Unsupported Grant Type");
    Ok(())
}

#[tokio::test]
async fn test_unparseable_body_is_unsupported_grant() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/oauth/token", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: serde_json::Value = response.json().await?;
    assert_eq!(error["error"], "Unsupported Grant Type");
    Ok(())
}

#[tokio::test]
async fn test_corrupt_stored_hash_is_unauthorized() -> Result<(), anyhow::Error> {
    let directory = TestDirectoryBuilder::new()
        .with_hashed_client("broken", "not-a-bcrypt-hash", "", false)
        .build();
    let server = TestAuthorityServer::spawn(directory, fixture_key_pair()).await?;

    let response = post_token(
        &server,
        &TokenRequestBuilder::client_credentials("broken", "whatever").build(),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
