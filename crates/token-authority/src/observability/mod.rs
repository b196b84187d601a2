//! Observability for the token authority.
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe
//! fields. Fields fall into three groups:
//! - **SAFE**: logged in plaintext (grant type, status, key id)
//! - **HASHED**: SHA-256 hashed for correlation (`client_id`)
//! - **NEVER**: never logged (client secrets, secret hashes, tokens, keys)

pub mod metrics;

use crate::config::LogFormat;
use crate::errors::AuthorityError;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "token_authority=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// With `log_file` set, every line goes to stdout and is appended to the
/// file. The returned guard flushes the file writer on drop and must live
/// as long as the process logs.
pub fn init_tracing(format: LogFormat, log_file: Option<&str>) -> io::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (writer, guard) = log_writer(log_file)?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| io::Error::other(e.to_string()))?;

    Ok(guard)
}

/// Stdout, optionally teed into an append-only file.
fn log_writer(log_file: Option<&str>) -> io::Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    let Some(path) = log_file else {
        return Ok((BoxMakeWriter::new(io::stdout), None));
    };

    let path = Path::new(path);
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    Ok((
        BoxMakeWriter::new(io::stdout.and(file_writer)),
        Some(guard),
    ))
}

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for `client_id` so failed and successful grants for the same client
/// can be correlated without the id appearing in plaintext.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unsupported grant, unknown client, wrong secret
    Authentication,
    /// Signing or key encoding failures
    Cryptographic,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthorityError> for ErrorCategory {
    fn from(err: &AuthorityError) -> Self {
        match err {
            AuthorityError::UnsupportedGrantType | AuthorityError::InvalidCredentials => {
                ErrorCategory::Authentication
            }
            AuthorityError::Crypto(_) => ErrorCategory::Cryptographic,
            AuthorityError::Internal => ErrorCategory::Internal,
        }
    }
}
