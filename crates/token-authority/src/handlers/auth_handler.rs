use crate::config::Config;
use crate::crypto::KeyPair;
use crate::errors::AuthorityError;
use crate::models::{AuthorizationDirectory, TokenRequest, TokenResponse};
use crate::observability::metrics::record_error;
use crate::observability::ErrorCategory;
use crate::services::token_service;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Application state shared across handlers
///
/// Built once at startup. Read-only afterwards.
pub struct AppState {
    pub key_pair: KeyPair,
    pub directory: AuthorizationDirectory,
    pub config: Config,
}

/// Handle token request (OAuth 2.0 Client Credentials)
///
/// POST /oauth/token
///
/// Fields are decoded one at a time; a body that is not a JSON object is
/// treated as an empty request and rejected as an unsupported grant.
#[instrument(name = "authority.token.issue", skip_all, fields(status))]
pub async fn handle_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, AuthorityError> {
    let request = TokenRequest::from_json_lenient(&body);

    let task_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        token_service::issue_token(
            &task_state.directory,
            &task_state.key_pair,
            task_state.config.token_lifetime_seconds,
            &request,
        )
    })
    .await
    .unwrap_or_else(|e| {
        tracing::error!(target: "authority.token", error = %e, "Token issuance task failed");
        Err(AuthorityError::Internal)
    });

    match &result {
        Ok(_) => {
            tracing::Span::current().record("status", "success");
        }
        Err(err) => {
            tracing::Span::current().record("status", "error");
            record_error(
                "token_issuance",
                ErrorCategory::from(err).as_str(),
                err.status_code().as_u16(),
            );
        }
    }

    result.map(Json)
}
