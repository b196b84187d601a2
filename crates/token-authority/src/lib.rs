//! Token Authority Library
//!
//! OAuth 2.0 `client_credentials` token issuance with RS256-signed JWTs and
//! JWKS publication of the signing key.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Signing key resolution, JWT signing, client secret hashing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Directory and wire models
//! - `repositories` - Authorization directory loading
//! - `routes` - Router assembly
//! - `server` - Plain or TLS listener with graceful shutdown
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod server;
pub mod services;
