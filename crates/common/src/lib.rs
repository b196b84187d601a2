//! Types shared between the token authority and the services that trust it.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JSON Web Key Set wire types
pub mod jwks;

/// Module for access token claims and verification
pub mod jwt;
