//! Token authority configuration.
//!
//! Loaded from environment variables. Empty values count as unset. The
//! private key passphrase is redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9065";

/// Default modulus size of a generated fallback key.
pub const DEFAULT_FALLBACK_KEY_BITS: usize = 2048;

/// Modulus sizes accepted for fallback key generation.
pub const ALLOWED_FALLBACK_KEY_BITS: [usize; 2] = [2048, 4096];

/// Default access token lifetime (1 hour).
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Default bound on draining in-flight requests at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_SECONDS: u64 = 5;

/// Default bcrypt cost for provisioning client secrets.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum bcrypt cost accepted when hashing.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum bcrypt cost accepted when hashing.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum plaintext length of a client secret at provisioning time.
pub const MIN_CLIENT_SECRET_LENGTH: usize = 6;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where to find the RSA signing key pair.
#[derive(Clone, Default)]
pub struct KeySource {
    pub private_key_path: Option<String>,
    pub public_key_path: Option<String>,
    pub private_key_passphrase: Option<SecretString>,
    pub fallback_key_bits: usize,
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource")
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field(
                "private_key_passphrase",
                &self.private_key_passphrase.as_ref().map(|_| "[REDACTED]"),
            )
            .field("fallback_key_bits", &self.fallback_key_bits)
            .finish()
    }
}

/// PEM certificate chain and private key for serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub key_source: KeySource,
    pub directory_path: String,
    pub token_lifetime_seconds: i64,
    pub shutdown_grace_seconds: u64,
    pub log_format: LogFormat,
    /// Also append logs to this file.
    pub log_file: Option<String>,
    /// Plain HTTP when `None`.
    pub tls: Option<TlsPaths>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let bind_address = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let directory_path = get("AUTH_DIRECTORY_PATH")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_DIRECTORY_PATH".to_string()))?;

        let fallback_key_bits = match get("RSA_FALLBACK_KEY_BITS") {
            Some(raw) => {
                let bits: usize = parse_number("RSA_FALLBACK_KEY_BITS", &raw)?;
                if !ALLOWED_FALLBACK_KEY_BITS.contains(&bits) {
                    return Err(ConfigError::InvalidValue {
                        name: "RSA_FALLBACK_KEY_BITS".to_string(),
                        reason: format!("must be 2048 or 4096, got {}", bits),
                    });
                }
                bits
            }
            None => DEFAULT_FALLBACK_KEY_BITS,
        };

        let token_lifetime_seconds = match get("TOKEN_LIFETIME_SECONDS") {
            Some(raw) => {
                let seconds: i64 = parse_number("TOKEN_LIFETIME_SECONDS", &raw)?;
                if seconds <= 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "TOKEN_LIFETIME_SECONDS".to_string(),
                        reason: format!("must be positive, got {}", seconds),
                    });
                }
                seconds
            }
            None => DEFAULT_TOKEN_LIFETIME_SECONDS,
        };

        let shutdown_grace_seconds = match get("SHUTDOWN_GRACE_SECONDS") {
            Some(raw) => parse_number("SHUTDOWN_GRACE_SECONDS", &raw)?,
            None => DEFAULT_SHUTDOWN_GRACE_SECONDS,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected 'text' or 'json', got '{}'", other),
                })
            }
        };

        let tls = match (get("TLS_CERT_PATH"), get("TLS_KEY_PATH")) {
            (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::InvalidValue {
                    name: "TLS_KEY_PATH".to_string(),
                    reason: "required when TLS_CERT_PATH is set".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    name: "TLS_CERT_PATH".to_string(),
                    reason: "required when TLS_KEY_PATH is set".to_string(),
                })
            }
        };

        // The passphrase is not trimmed; surrounding whitespace may be part of it.
        let private_key_passphrase = vars
            .get("RSA_PRIVATE_KEY_PASSPHRASE")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        Ok(Config {
            bind_address,
            key_source: KeySource {
                private_key_path: get("RSA_PRIVATE_KEY_PATH"),
                public_key_path: get("RSA_PUBLIC_KEY_PATH"),
                private_key_passphrase,
                fallback_key_bits,
            },
            directory_path,
            token_lifetime_seconds,
            shutdown_grace_seconds,
            log_format,
            log_file: get("LOG_FILE"),
            tls,
        })
    }
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
