//! Metrics definitions for the token authority.
//!
//! All metrics follow Prometheus naming conventions:
//! - `authority_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `grant_type`: `client_credentials` or `unsupported`
//! - `status`: `success`, `error`
//! - `origin`: `loaded`, `generated`
//! - `operation`: `hash`, `verify`
//! - `error_category`: see [`super::ErrorCategory`]

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return the handle that
/// renders `/metrics`.
///
/// # Errors
///
/// Returns error if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Token issuance is dominated by one bcrypt verification
        .set_buckets_for_metric(
            Matcher::Full("authority_token_issuance_duration_seconds".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        // Coarse buckets so the histogram does not resolve per-request timing
        .set_buckets_for_metric(
            Matcher::Full("authority_bcrypt_duration_seconds".to_string()),
            &[0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `authority_token_issuance_duration_seconds`, `authority_token_issuance_total`
/// Labels: `grant_type`, `status`
pub fn record_token_issuance(grant_type: &str, status: &str, duration: Duration) {
    histogram!("authority_token_issuance_duration_seconds", "grant_type" => grant_type.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("authority_token_issuance_total", "grant_type" => grant_type.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Key Metrics
// ============================================================================

/// Record how the signing key was resolved at startup
///
/// Metric: `authority_signing_key_resolutions_total`
/// Labels: `origin`
pub fn record_key_resolution(origin: &str) {
    counter!("authority_signing_key_resolutions_total", "origin" => origin.to_string())
        .increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `authority_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("authority_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

// ============================================================================
// JWKS Metrics
// ============================================================================

/// Metric: `authority_jwks_requests_total`
/// Labels: `status`
pub fn record_jwks_request(status: &str) {
    counter!("authority_jwks_requests_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `authority_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("authority_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}
