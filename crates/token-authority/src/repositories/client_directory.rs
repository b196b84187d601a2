//! Authorization directory loading and client lookup.
//!
//! The directory is a JSON file read once at startup and never mutated.

use crate::config::DEFAULT_BCRYPT_COST;
use crate::models::{AuthorizationDirectory, Client};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read authorization directory {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid authorization directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to prepare unknown-client hash: {0}")]
    DummyHash(#[from] bcrypt::BcryptError),
}

/// Plaintext behind the unknown-client hash. Never matches a request since
/// the hash is only consulted when no client was found.
const DUMMY_SECRET: &str = "unregistered-client";

/// Cost range bcrypt accepts.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Cost field of a `$2x$NN$...` hash.
fn bcrypt_cost(hash: &str) -> Option<u32> {
    let mut parts = hash.split('$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(""), Some(_), Some(cost)) => cost
            .parse()
            .ok()
            .filter(|cost| BCRYPT_COST_RANGE.contains(cost)),
        _ => None,
    }
}

impl AuthorizationDirectory {
    /// Load the directory from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let mut directory: AuthorizationDirectory = serde_json::from_str(json)?;

        // Unknown clients must cost as much bcrypt work as known ones
        let cost = directory.max_secret_cost().unwrap_or(DEFAULT_BCRYPT_COST);
        directory.dummy_secret_hash = bcrypt::hash(DUMMY_SECRET, cost)?;

        Ok(directory)
    }

    /// Highest bcrypt cost among the stored client hashes.
    pub fn max_secret_cost(&self) -> Option<u32> {
        self.clients
            .iter()
            .filter_map(|c| bcrypt_cost(&c.client_secret_hash))
            .max()
    }

    /// Hash verified when `find_client` finds nothing.
    pub fn dummy_secret_hash(&self) -> &str {
        &self.dummy_secret_hash
    }

    /// First client registered under `client_id`.
    pub fn find_client(&self, client_id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }
}
