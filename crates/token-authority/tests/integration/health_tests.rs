//! Integration tests for the health check and metrics endpoint

use authority_test_utils::*;
use reqwest::StatusCode;

/// `/health` returns 200 OK as long as the process serves HTTP.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthorityServer::spawn_default().await?;

    // Act
    let response = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_renders_text() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;
    let client = reqwest::Client::new();

    // Generate some traffic first
    client
        .post(format!("{}/oauth/token", server.url()))
        .json(&TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET).build())
        .send()
        .await?;

    let response = client
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    // Body content depends on which server in this process installed the
    // global recorder, so only the status is checked.
    let _ = response.text().await?;
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let response = reqwest::get(format!("{}/api/v1/anything", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_token_endpoint_rejects_get() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;

    let response = reqwest::get(format!("{}/oauth/token", server.url())).await?;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
