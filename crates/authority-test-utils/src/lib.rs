//! # Authority Test Utilities
//!
//! Shared test utilities for the token authority.
//!
//! This crate provides:
//! - Fixed RSA key fixtures in every accepted PEM encoding
//! - Test data builders (TestDirectoryBuilder, TokenRequestBuilder)
//! - Server test harness (TestAuthorityServer for E2E tests)
//! - Fixed test identities (client ids, secrets, hashes)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authority_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestAuthorityServer::spawn_default().await?;
//!
//!     let body = TokenRequestBuilder::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
//!         .build();
//!     let token: String = /* POST body to {server.url()}/oauth/token */;
//!
//!     token.assert_valid_jwt()
//!          .assert_signed_by(FIXTURE_THUMBPRINT)
//!          .assert_has_scope(TEST_CLIENT_SCOPE);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
