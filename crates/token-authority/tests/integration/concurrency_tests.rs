//! Concurrent issuance against a single authority
//!
//! Token requests and JWKS fetches race each other; every token must carry
//! the one published key id and verify against the published set.

use authority_test_utils::*;
use common::jwks::Jwks;
use common::jwt::{extract_kid, verify_access_token};
use tokio::task::JoinSet;
use token_authority::models::TokenResponse;

const CONCURRENT_REQUESTS: usize = 16;

enum Fetched {
    Token(String),
    Jwks(Jwks),
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tokens_share_published_kid() -> Result<(), anyhow::Error> {
    let server = TestAuthorityServer::spawn_default().await?;
    let client = reqwest::Client::new();
    let token_url = format!("{}/oauth/token", server.url());
    let jwks_url = format!("{}/.well-known/jwks.json", server.url());

    let mut tasks = JoinSet::new();
    for i in 0..CONCURRENT_REQUESTS {
        let (client, token_url, jwks_url) = (client.clone(), token_url.clone(), jwks_url.clone());
        let jwks_client = client.clone();
        // Alternate the two clients so both directory entries are exercised
        let (client_id, client_secret) = if i % 2 == 0 {
            (TEST_CLIENT_ID, TEST_CLIENT_SECRET)
        } else {
            (TEST_ADMIN_CLIENT_ID, TEST_ADMIN_CLIENT_SECRET)
        };

        tasks.spawn(async move {
            let body = TokenRequestBuilder::client_credentials(client_id, client_secret).build();
            let response: TokenResponse = client
                .post(&token_url)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(Fetched::Token(response.access_token))
        });
        tasks.spawn(async move {
            let jwks: Jwks = jwks_client
                .get(&jwks_url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(Fetched::Jwks(jwks))
        });
    }

    let mut tokens = Vec::new();
    let mut key_sets = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined?? {
            Fetched::Token(token) => tokens.push(token),
            Fetched::Jwks(jwks) => key_sets.push(jwks),
        }
    }
    assert_eq!(tokens.len(), CONCURRENT_REQUESTS);
    assert_eq!(key_sets.len(), CONCURRENT_REQUESTS);

    let published = key_sets
        .first()
        .ok_or_else(|| anyhow::anyhow!("no JWKS fetched"))?;
    assert!(key_sets.iter().all(|jwks| jwks == published));
    assert_eq!(published.keys.len(), 1);
    let key = published
        .keys
        .first()
        .ok_or_else(|| anyhow::anyhow!("empty JWKS"))?;
    assert_eq!(key.kid, server.thumbprint());
    assert_eq!(key.x5t, key.kid);

    for token in &tokens {
        let kid = extract_kid(token)?;
        assert_eq!(kid, key.kid);
        assert_eq!(kid, key.x5t);
        verify_access_token(token, published, Some(TEST_ISSUER), None)?;
    }
    Ok(())
}
