use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthorityError {
    /// Missing or non-`client_credentials` grant type.
    #[error("Unsupported grant type")]
    UnsupportedGrantType,

    /// Unknown client or wrong secret. The two are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl AuthorityError {
    pub fn status_code(&self) -> StatusCode {
        self.status_and_message().0
    }

    /// Status code and the client-facing message.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthorityError::UnsupportedGrantType => {
                (StatusCode::UNAUTHORIZED, "Unsupported Grant Type")
            }
            AuthorityError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthorityError::Crypto(_) | AuthorityError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

impl IntoResponse for AuthorityError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(target: "authority.errors", error = %self, "Request failed");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
