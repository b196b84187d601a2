//! Secret types for values that must never reach a log line.
//!
//! Re-exports the [`secrecy`] wrappers. `SecretString` and `SecretBox<T>`
//! print as `[REDACTED]` under `{:?}`, so a struct that derives `Debug` and
//! holds one stays safe to pass to `tracing`. Values are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct GrantRequest {
//!     client_id: String,
//!     client_secret: SecretString,
//! }
//!
//! let json = r#"{"client_id": "cl1", "client_secret": "secret1"}"#;
//! let req: GrantRequest = serde_json::from_str(json).unwrap();
//!
//! assert!(!format!("{req:?}").contains("secret1"));
//! assert_eq!(req.client_secret.expose_secret(), "secret1");
//! ```
//!
//! Use `SecretString` for client secrets and key passphrases.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
