//! Gateway error taxonomy and its mapping onto HTTP responses
//!
//! Every failure is terminal for the originating request only. Provider
//! errors are logged here, at the response boundary, and replaced by a
//! client-safe message; only the OAuth callback returns the raw provider
//! payload.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics;

/// Per-request gateway errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The session holds no access token.
    #[error("Not authenticated")]
    AuthenticationMissing,

    /// A provider API call was rejected or failed in transit.
    #[error("{operation} call failed: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: fantasy_api::Error,
    },

    /// The public read API answered with a non-200 status.
    #[error("Upstream responded with status {0}")]
    UpstreamStatus(u16),

    #[error("public player request failed: {0}")]
    PublicRequest(#[source] reqwest::Error),

    #[error("player data is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("OAuth callback failed: {0}")]
    TokenExchange(#[source] yahoo_auth::Error),

    #[error("session destruction failed: {0}")]
    SessionDestruction(#[source] session::Error),

    #[error("session store failed: {0}")]
    SessionStore(#[source] session::Error),
}

impl GatewayError {
    pub fn upstream(operation: &'static str, source: fantasy_api::Error) -> Self {
        Self::Upstream { operation, source }
    }
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthenticationMissing => {
                (StatusCode::UNAUTHORIZED, "Not authenticated").into_response()
            }
            Self::Upstream {
                operation,
                ref source,
            } => {
                error!(operation, error = %source, "upstream call failed");
                metrics::record_upstream_error(operation);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch {operation}"),
                )
            }
            Self::UpstreamStatus(code) => {
                warn!(status = code, "public player endpoint returned non-200");
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
                json_error(status, format!("Upstream responded with status {code}"))
            }
            Self::PublicRequest(ref e) => {
                error!(error = %e, "public player request failed");
                metrics::record_upstream_error("public players");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch players")
            }
            Self::Parse(ref e) => {
                error!(error = %e, "failed to parse public player data");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse player data",
                )
            }
            Self::InvalidRequest(message) => json_error(StatusCode::BAD_REQUEST, message),
            Self::TokenExchange(ref e) => {
                error!(error = %e, "OAuth callback failed");
                let payload = e.raw_payload();
                let content_type = if serde_json::from_str::<serde_json::Value>(&payload).is_ok()
                {
                    "application/json"
                } else {
                    "text/plain; charset=utf-8"
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, content_type)],
                    payload,
                )
                    .into_response()
            }
            Self::SessionDestruction(ref e) => {
                error!(error = %e, "failed to destroy session");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to log out").into_response()
            }
            Self::SessionStore(ref e) => {
                error!(error = %e, "session store unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
        }
    }
}
