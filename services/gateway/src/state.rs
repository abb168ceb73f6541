//! Shared application state

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use fantasy_api::{FantasyApi, LeagueKey};
use metrics_exporter_prometheus::PrometheusHandle;
use session::SessionStore;
use yahoo_auth::OAuthClient;

use crate::metrics::ServiceMetrics;

/// Session cookie settings
#[derive(Clone)]
pub struct CookieSettings {
    /// Encryption key for the private session cookie
    pub key: Key,
    pub name: String,
    pub secure: bool,
}

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn FantasyApi>,
    pub oauth: Arc<OAuthClient>,
    /// Plain HTTP client for the token exchange and the public read API
    pub http: reqwest::Client,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookieSettings,
    pub sport: String,
    pub leagues: Arc<Vec<LeagueKey>>,
    pub public_api_base_url: String,
    pub metrics: ServiceMetrics,
    pub prometheus: PrometheusHandle,
}

impl AppState {
    /// League key for a numeric league id from a route path.
    pub fn league_key(&self, league_id: &str) -> LeagueKey {
        LeagueKey::new(&self.sport, league_id)
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookies.key.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Test doubles and state builders shared by the handler tests.

    use super::*;
    use axum::response::IntoResponse;
    use axum_extra::extract::PrivateCookieJar;
    use axum_extra::extract::cookie::Cookie;
    use fantasy_api::{AccessToken, ApiFuture, PlayerFilters, TeamKey};
    use serde_json::Value;
    use session::{MemorySessionStore, SessionData, SessionId};
    use std::sync::Mutex;
    use std::time::Duration;
    use yahoo_auth::OAuthEndpoints;

    pub const COOKIE_NAME: &str = "fantasy_session";

    /// One recorded `FantasyApi` invocation. Tokens are kept as bearer
    /// header values so tests can assert which credential each call used.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ApiCall {
        UserGames { bearer: String },
        Leagues { bearer: String, keys: Vec<String> },
        LeaguePlayers { bearer: String, league: String, filters: PlayerFilters },
        DraftResults { bearer: String, league: String },
        LeagueTeams { bearer: String, league: String },
        TeamRoster { bearer: String, team: String },
    }

    /// `FantasyApi` double that records calls and returns a canned payload.
    pub struct RecordingApi {
        calls: Mutex<Vec<ApiCall>>,
        payload: Value,
        fail: bool,
    }

    impl RecordingApi {
        pub fn returning(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                payload,
                fail: false,
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                payload: Value::Null,
                fail: true,
            })
        }

        pub fn calls(&self) -> Vec<ApiCall> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, call: ApiCall) -> ApiFuture<'_, Value> {
            self.calls.lock().unwrap().push(call);
            let result = if self.fail {
                Err(fantasy_api::Error::Status {
                    status: 500,
                    body: "provider exploded".into(),
                })
            } else {
                Ok(self.payload.clone())
            };
            Box::pin(async move { result })
        }
    }

    impl FantasyApi for RecordingApi {
        fn user_games<'a>(&'a self, token: &'a AccessToken) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::UserGames {
                bearer: token.bearer(),
            })
        }

        fn leagues<'a>(
            &'a self,
            token: &'a AccessToken,
            keys: &'a [LeagueKey],
        ) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::Leagues {
                bearer: token.bearer(),
                keys: keys.iter().map(|k| k.to_string()).collect(),
            })
        }

        fn league_players<'a>(
            &'a self,
            token: &'a AccessToken,
            league: &'a LeagueKey,
            filters: &'a PlayerFilters,
        ) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::LeaguePlayers {
                bearer: token.bearer(),
                league: league.to_string(),
                filters: filters.clone(),
            })
        }

        fn draft_results<'a>(
            &'a self,
            token: &'a AccessToken,
            league: &'a LeagueKey,
        ) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::DraftResults {
                bearer: token.bearer(),
                league: league.to_string(),
            })
        }

        fn league_teams<'a>(
            &'a self,
            token: &'a AccessToken,
            league: &'a LeagueKey,
        ) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::LeagueTeams {
                bearer: token.bearer(),
                league: league.to_string(),
            })
        }

        fn team_roster<'a>(
            &'a self,
            token: &'a AccessToken,
            team: &'a TeamKey,
        ) -> ApiFuture<'a, Value> {
            self.respond(ApiCall::TeamRoster {
                bearer: token.bearer(),
                team: team.to_string(),
            })
        }
    }

    /// Create a PrometheusHandle for tests without installing a global recorder.
    pub fn test_prometheus_handle() -> PrometheusHandle {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        recorder.handle()
    }

    /// Build test state with an in-memory session store.
    pub fn test_state(api: Arc<dyn FantasyApi>) -> AppState {
        test_state_with(api, Arc::new(MemorySessionStore::new(Duration::from_secs(600))))
    }

    pub fn test_state_with(api: Arc<dyn FantasyApi>, sessions: Arc<dyn SessionStore>) -> AppState {
        AppState {
            api,
            oauth: Arc::new(OAuthClient::new(
                "consumer-key",
                common::Secret::new("consumer-secret".to_string()),
                "https://localhost:3000/auth/yahoo/callback",
                OAuthEndpoints::default(),
            )),
            http: reqwest::Client::new(),
            sessions,
            cookies: CookieSettings {
                key: Key::generate(),
                name: COOKIE_NAME.to_string(),
                secure: false,
            },
            sport: "nfl".to_string(),
            leagues: Arc::new(vec![LeagueKey::new("nfl", "123"), LeagueKey::new("nfl", "456")]),
            public_api_base_url: "http://127.0.0.1:1/fantasy/v2".to_string(),
            metrics: ServiceMetrics::new(),
            prometheus: test_prometheus_handle(),
        }
    }

    /// `Cookie` request header value carrying `id` encrypted with the
    /// state's key, as a browser would send it back.
    pub fn cookie_header(state: &AppState, id: &SessionId) -> String {
        let jar = PrivateCookieJar::new(state.cookies.key.clone())
            .add(Cookie::new(COOKIE_NAME, id.as_str().to_string()));
        let response = jar.into_response();
        let set_cookie = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// Store a session holding `access_token` and return its cookie header.
    pub async fn login(state: &AppState, access_token: &str) -> String {
        let id = SessionId::generate();
        state
            .sessions
            .save(
                &id,
                SessionData::with_tokens(access_token.to_string(), Some("refresh".into())),
            )
            .await
            .unwrap();
        cookie_header(state, &id)
    }

    /// Read a response body as JSON.
    pub async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Read a response body as text.
    pub async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8_lossy(&body).to_string()
    }
}
