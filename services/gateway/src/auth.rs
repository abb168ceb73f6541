//! OAuth handshake and logout routes
//!
//! `GET /auth/yahoo` sends the browser to the provider consent page. The
//! callback exchanges the authorization code, stores both tokens under a
//! freshly generated session id and sets the private cookie. Logout
//! destroys the whole record.

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use session::{SessionData, SessionId};
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::extractor::{CurrentSession, clear_session_cookie, session_cookie};
use crate::state::AppState;

/// Query parameters the provider appends to the callback redirect
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// 302 Found to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /auth/yahoo
pub async fn begin(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let url = state
        .oauth
        .authorization_url()
        .map_err(GatewayError::TokenExchange)?;
    Ok(found(&url))
}

/// GET /auth/yahoo/callback
pub async fn callback(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(PrivateCookieJar, Response), GatewayError> {
    if let Some(error) = params.error {
        warn!(error = %error, "provider denied authorization");
        return Err(GatewayError::TokenExchange(yahoo_auth::Error::Denied {
            error,
            description: params.error_description,
        }));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(GatewayError::TokenExchange(yahoo_auth::Error::MissingCode))?;

    let token = state
        .oauth
        .exchange_code(&state.http, &code)
        .await
        .map_err(GatewayError::TokenExchange)?;

    // New id on every login; the pre-login record must not survive
    if let Some(old) = &current.id {
        state
            .sessions
            .destroy(old)
            .await
            .map_err(GatewayError::SessionStore)?;
    }

    let id = SessionId::generate();
    state
        .sessions
        .save(
            &id,
            SessionData::with_tokens(token.access_token, token.refresh_token),
        )
        .await
        .map_err(GatewayError::SessionStore)?;

    info!(session = %id, guid = ?token.xoauth_yahoo_guid, "user authenticated");
    let jar = jar.add(session_cookie(&state.cookies, &id));
    Ok((jar, found("/")))
}

/// GET /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Response), GatewayError> {
    if let Some(id) = &current.id {
        state
            .sessions
            .destroy(id)
            .await
            .map_err(GatewayError::SessionDestruction)?;
        info!(session = %id, "session destroyed");
    }
    let jar = jar.remove(clear_session_cookie(&state.cookies));
    Ok((jar, found("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use crate::state::testing::{
        RecordingApi, body_json, body_text, cookie_header, login, test_state, test_state_with,
    };
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use serde_json::json;
    use session::{SessionStore, StoreFuture};
    use std::sync::Arc;
    use tower::ServiceExt;
    use yahoo_auth::{OAuthClient, OAuthEndpoints};

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    /// Point the state's OAuth client at a mock token endpoint.
    fn with_token_url(mut state: AppState, token_url: String) -> AppState {
        state.oauth = Arc::new(OAuthClient::new(
            "consumer-key",
            common::Secret::new("consumer-secret".to_string()),
            "https://localhost:3000/auth/yahoo/callback",
            OAuthEndpoints {
                token: token_url,
                ..OAuthEndpoints::default()
            },
        ));
        state
    }

    fn set_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    /// Store whose destroy always fails.
    struct BrokenDestroy(session::MemorySessionStore);

    impl SessionStore for BrokenDestroy {
        fn load<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionData>> {
            self.0.load(id)
        }
        fn save<'a>(&'a self, id: &'a SessionId, data: SessionData) -> StoreFuture<'a, ()> {
            self.0.save(id, data)
        }
        fn destroy<'a>(&'a self, _id: &'a SessionId) -> StoreFuture<'a, ()> {
            Box::pin(async { Err(session::Error::Backend("store offline".into())) })
        }
        fn purge_expired(&self) -> StoreFuture<'_, usize> {
            self.0.purge_expired()
        }
        fn count(&self) -> StoreFuture<'_, usize> {
            self.0.count()
        }
    }

    #[tokio::test]
    async fn begin_redirects_to_consent_page() {
        let state = test_state(RecordingApi::returning(json!({})));
        let response = build_router(state, 1000)
            .oneshot(get("/auth/yahoo", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://api.login.yahoo.com/oauth2/request_auth?"));
        assert!(location.contains("client_id=consumer-key"));
        assert!(location.contains("response_type=code"));
    }

    #[tokio::test]
    async fn callback_stores_tokens_and_sets_cookie() {
        let token_server = Router::new().route(
            "/oauth2/get_token",
            post(|| async {
                axum::Json(json!({
                    "access_token": "fresh-access",
                    "refresh_token": "fresh-refresh",
                    "expires_in": 3600,
                    "token_type": "bearer"
                }))
            }),
        );
        let base = spawn_server(token_server).await;
        let api = RecordingApi::returning(json!({"guid": "G1"}));
        let state = with_token_url(test_state(api.clone()), format!("{base}/oauth2/get_token"));
        let app = build_router(state.clone(), 1000);

        let response = app
            .clone()
            .oneshot(get("/auth/yahoo/callback?code=abc", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = set_cookie(&response).expect("session cookie must be set");
        assert!(cookie.contains("HttpOnly"));
        let cookie = cookie.split(';').next().unwrap().to_string();

        assert_eq!(state.sessions.count().await.unwrap(), 1);

        let profile = app
            .oneshot(get("/api/user/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(profile.status(), StatusCode::OK);
        assert_eq!(body_json(profile).await, json!({"guid": "G1"}));
        assert_eq!(
            api.calls(),
            vec![crate::state::testing::ApiCall::UserGames {
                bearer: "Bearer fresh-access".into()
            }]
        );
    }

    #[tokio::test]
    async fn callback_replaces_previous_session_record() {
        let token_server = Router::new().route(
            "/token",
            post(|| async { axum::Json(json!({"access_token": "second"})) }),
        );
        let base = spawn_server(token_server).await;
        let state = with_token_url(
            test_state(RecordingApi::returning(json!({}))),
            format!("{base}/token"),
        );
        let old_cookie = login(&state, "first").await;
        assert_eq!(state.sessions.count().await.unwrap(), 1);

        let response = build_router(state.clone(), 1000)
            .oneshot(get("/auth/yahoo/callback?code=abc", Some(&old_cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            state.sessions.count().await.unwrap(),
            1,
            "old record destroyed, new one stored"
        );

        let stale = build_router(state, 1000)
            .oneshot(get("/api/leagues", Some(&old_cookie)))
            .await
            .unwrap();
        assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn callback_surfaces_raw_provider_error() {
        let provider_body = r#"{"error":"invalid_grant","error_description":"code expired"}"#;
        let token_server = Router::new().route(
            "/token",
            post(move || async move {
                (
                    StatusCode::BAD_REQUEST,
                    [(header::CONTENT_TYPE, "application/json")],
                    provider_body,
                )
            }),
        );
        let base = spawn_server(token_server).await;
        let state = with_token_url(
            test_state(RecordingApi::returning(json!({}))),
            format!("{base}/token"),
        );

        let response = build_router(state.clone(), 1000)
            .oneshot(get("/auth/yahoo/callback?code=stale", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(set_cookie(&response).is_none());
        assert_eq!(body_text(response).await, provider_body);
        assert_eq!(state.sessions.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn callback_without_code_fails() {
        let state = test_state(RecordingApi::returning(json!({})));
        let response = build_router(state, 1000)
            .oneshot(get("/auth/yahoo/callback", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn callback_with_denial_returns_provider_error() {
        let state = test_state(RecordingApi::returning(json!({})));
        let response = build_router(state, 1000)
            .oneshot(get(
                "/auth/yahoo/callback?error=access_denied&error_description=user%20said%20no",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "access_denied", "error_description": "user said no"})
        );
    }

    #[tokio::test]
    async fn logout_destroys_session_and_redirects_home() {
        let api = RecordingApi::returning(json!({}));
        let state = test_state(api.clone());
        let cookie = login(&state, "tok").await;
        let app = build_router(state.clone(), 1000);

        let response = app
            .clone()
            .oneshot(get("/auth/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(set_cookie(&response).is_some(), "cookie must be cleared");
        assert_eq!(state.sessions.count().await.unwrap(), 0);

        // The browser may still replay the old cookie
        for route in [
            "/api/user/profile",
            "/api/leagues",
            "/api/leagues/123/free-agents",
            "/api/leagues/123/draft-results",
            "/api/leagues/123/teams",
            "/api/leagues/123/teams/nfl.l.123.t.1/roster",
        ] {
            let response = app.clone().oneshot(get(route, Some(&cookie))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{route}");
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn logout_without_session_is_a_no_op() {
        let state = test_state(RecordingApi::returning(json!({})));
        let response = build_router(state, 1000)
            .oneshot(get("/auth/logout", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn logout_store_failure_is_500() {
        let store = Arc::new(BrokenDestroy(session::MemorySessionStore::new(
            std::time::Duration::from_secs(600),
        )));
        let state = test_state_with(RecordingApi::returning(json!({})), store);
        let id = SessionId::generate();
        state
            .sessions
            .save(&id, SessionData::with_tokens("tok".into(), None))
            .await
            .unwrap();
        let cookie = cookie_header(&state, &id);

        let response = build_router(state, 1000)
            .oneshot(get("/auth/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Failed to log out");
    }
}
