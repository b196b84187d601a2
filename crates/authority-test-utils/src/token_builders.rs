//! Builder patterns for test data construction
//!
//! Fluent APIs for authorization directories and token request bodies.

use crate::test_ids::{
    TEST_ADMIN_CLIENT_ID, TEST_ADMIN_CLIENT_SECRET_HASH, TEST_CLIENT_ID, TEST_CLIENT_SCOPE,
    TEST_CLIENT_SECRET_HASH, TEST_ISSUER,
};
use serde_json::json;
use token_authority::models::AuthorizationDirectory;

/// bcrypt cost for secrets hashed by the builder. Below the provisioning
/// minimum so tests stay fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Builder for authorization directories
///
/// # Example
/// ```rust,ignore
/// let directory = TestDirectoryBuilder::new()
///     .with_client("svc-a", "a-secret", "read", false)
///     .build();
/// ```
pub struct TestDirectoryBuilder {
    issuer: String,
    clients: Vec<serde_json::Value>,
}

impl TestDirectoryBuilder {
    /// Empty directory with the test issuer
    pub fn new() -> Self {
        Self {
            issuer: TEST_ISSUER.to_string(),
            clients: Vec::new(),
        }
    }

    /// Directory holding the two standard test clients (`cl1`, `cl2`)
    pub fn standard() -> Self {
        Self::new()
            .with_hashed_client(TEST_CLIENT_ID, TEST_CLIENT_SECRET_HASH, TEST_CLIENT_SCOPE, false)
            .with_hashed_client(TEST_ADMIN_CLIENT_ID, TEST_ADMIN_CLIENT_SECRET_HASH, "", true)
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    /// Add a client, hashing `secret` at [`TEST_BCRYPT_COST`]
    pub fn with_client(self, client_id: &str, secret: &str, scope: &str, is_admin: bool) -> Self {
        let hash = bcrypt::hash(secret, TEST_BCRYPT_COST).expect("bcrypt hash should succeed");
        self.with_hashed_client(client_id, &hash, scope, is_admin)
    }

    /// Add a client with a precomputed (or deliberately broken) hash
    pub fn with_hashed_client(
        mut self,
        client_id: &str,
        secret_hash: &str,
        scope: &str,
        is_admin: bool,
    ) -> Self {
        self.clients.push(json!({
            "clientId": client_id,
            "clientSecret": secret_hash,
            "scope": scope,
            "isAdmin": is_admin,
        }));
        self
    }

    /// The directory file contents
    pub fn to_json(&self) -> String {
        json!({
            "issuer": self.issuer,
            "clients": self.clients,
        })
        .to_string()
    }

    pub fn build(self) -> AuthorizationDirectory {
        AuthorizationDirectory::from_json_str(&self.to_json())
            .expect("builder should produce a valid directory")
    }
}

impl Default for TestDirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `POST /oauth/token` bodies
///
/// # Example
/// ```rust,ignore
/// let body = TokenRequestBuilder::client_credentials("cl1", "secret1")
///     .with_audience("orders-api")
///     .build();
/// ```
pub struct TokenRequestBuilder {
    grant_type: String,
    client_id: String,
    client_secret: String,
    audience: Option<String>,
}

impl TokenRequestBuilder {
    pub fn client_credentials(client_id: &str, client_secret: &str) -> Self {
        Self {
            grant_type: "client_credentials".to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            audience: None,
        }
    }

    pub fn with_grant_type(mut self, grant_type: &str) -> Self {
        self.grant_type = grant_type.to_string();
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.audience = Some(audience.to_string());
        self
    }

    /// Build the request body as a JSON value
    pub fn build(self) -> serde_json::Value {
        let mut body = json!({
            "grant_type": self.grant_type,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
        });
        if let (Some(audience), Some(map)) = (self.audience, body.as_object_mut()) {
            map.insert("audience".to_string(), json!(audience));
        }
        body
    }
}
