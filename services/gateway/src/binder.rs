//! Token binding for authenticated routes
//!
//! The caller's access token is read from their session and handed to the
//! provider call as an explicit argument. Nothing shared is mutated, so
//! concurrent requests from different sessions cannot see each other's
//! credentials.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fantasy_api::AccessToken;
use session::SessionData;

use crate::error::GatewayError;
use crate::extractor::CurrentSession;
use crate::state::AppState;

/// Return the session's access token, or `AuthenticationMissing`.
pub fn require_token(session: &SessionData) -> Result<AccessToken, GatewayError> {
    session
        .access_token
        .as_ref()
        .map(|token| AccessToken::new(token.expose().clone()))
        .ok_or(GatewayError::AuthenticationMissing)
}

/// Extractor for authenticated handlers. Rejects with 401 before the
/// handler body runs, so no provider call is attempted without a token.
pub struct BoundToken(pub AccessToken);

impl FromRequestParts<AppState> for BoundToken {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state).await?;
        require_token(&session.data).map(BoundToken)
    }
}
