//! Test server harness for E2E testing
//!
//! Provides TestAuthorityServer for spawning real token authority instances
//! in tests.

use crate::crypto_fixtures::fixture_key_pair;
use crate::token_builders::TestDirectoryBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use token_authority::config::Config;
use token_authority::crypto::KeyPair;
use token_authority::models::AuthorizationDirectory;
use token_authority::routes::{self, AppState};

/// Test harness for spawning the token authority in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_token_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestAuthorityServer::spawn_default().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/oauth/token", server.url()))
///         .json(&TokenRequestBuilder::client_credentials("cl1", "secret1").build())
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAuthorityServer {
    addr: SocketAddr,
    thumbprint: String,
    config: Config,
    handle: JoinHandle<()>,
}

impl TestAuthorityServer {
    /// Standard test directory signed with the fixture key
    pub async fn spawn_default() -> Result<Self, anyhow::Error> {
        Self::spawn(TestDirectoryBuilder::standard().build(), fixture_key_pair()).await
    }

    /// Spawn a server for `directory`, signing with `key_pair`
    pub async fn spawn(
        directory: AuthorizationDirectory,
        key_pair: KeyPair,
    ) -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(directory, key_pair, HashMap::new()).await
    }

    /// Spawn with extra configuration variables (e.g. `TOKEN_LIFETIME_SECONDS`)
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Serve the real router from `token_authority::routes`
    /// - Run in the background until dropped
    pub async fn spawn_with_vars(
        directory: AuthorizationDirectory,
        key_pair: KeyPair,
        mut vars: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        // Directory is handed over in memory; the path is never read
        vars.entry("AUTH_DIRECTORY_PATH".to_string())
            .or_insert_with(|| "in-memory".to_string());
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string());
        let config = Config::from_vars(&vars)?;

        let thumbprint = key_pair.thumbprint().to_string();

        let state = Arc::new(AppState {
            key_pair,
            directory,
            config: config.clone(),
        });

        // Only the first server in a test process can install the global
        // recorder; later ones render a standalone recorder.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            thumbprint,
            config,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `kid` of the signing key
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestAuthorityServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
