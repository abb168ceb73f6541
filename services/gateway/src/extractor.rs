//! Cookie-backed session extraction
//!
//! The session id travels in a private (encrypted) cookie. A missing,
//! undecryptable or malformed cookie is the same as a fresh, empty session;
//! records are only written when the OAuth callback stores tokens.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use session::{SessionData, SessionId};
use tracing::debug;

use crate::error::GatewayError;
use crate::state::{AppState, CookieSettings};

/// The caller's session, loaded from the store.
#[derive(Debug, Default)]
pub struct CurrentSession {
    /// Id from a well-formed cookie, whether or not the store knows it
    pub id: Option<SessionId>,
    pub data: SessionData,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        let Some(cookie) = jar.get(&state.cookies.name) else {
            return Ok(Self::default());
        };
        let id = match SessionId::parse(cookie.value()) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "ignoring malformed session cookie");
                return Ok(Self::default());
            }
        };

        let data = state
            .sessions
            .load(&id)
            .await
            .map_err(GatewayError::SessionStore)?
            .unwrap_or_default();

        Ok(Self { id: Some(id), data })
    }
}

/// Session cookie pointing at `id`. No max-age: the store's idle TTL is
/// the expiry policy.
pub fn session_cookie(settings: &CookieSettings, id: &SessionId) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), id.as_str().to_string()))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Removal cookie for the session.
pub fn clear_session_cookie(settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), "")).path("/").build()
}
