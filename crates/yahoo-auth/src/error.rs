//! Error types for the OAuth handshake

/// Errors from the authorization redirect and token exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The token endpoint answered with a non-success status. `body` is the
    /// raw payload so the gateway can surface it unchanged.
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The provider redirected back with `error=` instead of a code.
    #[error("authorization denied: {error}")]
    Denied {
        error: String,
        description: Option<String>,
    },

    #[error("callback did not include an authorization code")]
    MissingCode,

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Raw error payload for the callback failure response.
    ///
    /// Token endpoint bodies are returned verbatim; every other failure is
    /// rendered as a small JSON object.
    pub fn raw_payload(&self) -> String {
        match self {
            Error::TokenEndpoint { body, .. } => body.clone(),
            Error::Denied { error, description } => serde_json::json!({
                "error": error,
                "error_description": description,
            })
            .to_string(),
            other => serde_json::json!({ "error": other.to_string() }).to_string(),
        }
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
