use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The only grant type the authority accepts.
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Token type returned with every issued access token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// A registered machine client.
///
/// Static configuration. `client_secret_hash` is a bcrypt hash and is
/// redacted from Debug output.
#[derive(Clone, Deserialize)]
pub struct Client {
    #[serde(rename = "clientId", alias = "client_id")]
    pub client_id: String,

    #[serde(rename = "clientSecret", alias = "client_secret")]
    pub client_secret_hash: String,

    #[serde(default)]
    pub scope: String,

    #[serde(rename = "isAdmin", alias = "is_admin", default)]
    pub is_admin: bool,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("client_secret_hash", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Issuer identity plus the ordered list of registered clients.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationDirectory {
    pub issuer: String,

    #[serde(default)]
    pub clients: Vec<Client>,

    /// Verified in place of a real hash when a client id is unknown. Set at
    /// load time to the highest cost found among the clients.
    #[serde(skip)]
    pub(crate) dummy_secret_hash: String,
}

/// Body of `POST /oauth/token`.
///
/// Every field defaults to empty so a partial body still reaches the grant
/// check.
#[derive(Clone, Default)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub audience: String,
}

impl TokenRequest {
    /// Decode a request body field by field.
    ///
    /// A field that is absent, `null`, or not a string stays empty without
    /// affecting the others. A body that is not a JSON object yields an
    /// empty request.
    pub fn from_json_lenient(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(target: "authority.token", error = %e, "Unparseable token request body");
                return Self::default();
            }
        };

        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            grant_type: field("grant_type"),
            client_id: field("client_id"),
            client_secret: field("client_secret"),
            audience: field("audience"),
        }
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    pub expires_in: i64,
}
