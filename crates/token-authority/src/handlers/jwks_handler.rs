use crate::observability::metrics::record_jwks_request;
use crate::services::key_management_service;
use axum::{
    extract::State,
    http::{
        header::{HeaderMap, HeaderValue, CACHE_CONTROL},
        StatusCode,
    },
    Json,
};
use common::jwks::Jwks;
use std::sync::Arc;
use tracing::instrument;

use super::auth_handler::AppState;

/// Handle JWKS request
///
/// GET /.well-known/jwks.json
///
/// Returns the active public key in JWKS format (RFC 7517) with
/// `Cache-Control: max-age=3600`. If the key cannot be encoded the response
/// is a 500 carrying an empty key set.
#[instrument(name = "authority.jwks.get", skip_all, fields(status))]
pub async fn handle_get_jwks(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, HeaderMap, Json<Jwks>) {
    match key_management_service::publish_jwks(&state.key_pair) {
        Ok(jwks) => {
            tracing::Span::current().record("status", "success");
            record_jwks_request("success");

            let mut headers = HeaderMap::new();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=3600"));
            (StatusCode::OK, headers, Json(jwks))
        }
        Err(e) => {
            tracing::Span::current().record("status", "error");
            tracing::error!(target: "authority.jwks", error = %e, "Failed to encode JWKS");
            record_jwks_request("error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HeaderMap::new(),
                Json(Jwks::empty()),
            )
        }
    }
}
