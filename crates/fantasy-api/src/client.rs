//! reqwest-backed implementation of `FantasyApi`

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::keys::{AccessToken, LeagueKey, TeamKey};
use crate::reshape::{extract_resource, lift_roster};
use crate::{ApiFuture, Error, FantasyApi, PlayerFilters, Result};

/// Default base URL of the provider's v2 API
pub const API_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

/// Shared provider client. Cheap to clone; holds no user credentials.
#[derive(Debug, Clone)]
pub struct YahooFantasyClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooFantasyClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base>/<path>?format=json` with the caller's bearer token.
    #[instrument(skip(self, token))]
    async fn get_json(&self, token: &AccessToken, path: &str) -> Result<Value> {
        let url = format!("{}/{}?format=json", self.base_url, path);
        debug!("calling provider");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(status = status.as_u16(), "provider rejected request");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }

    async fn resource(&self, token: &AccessToken, path: &str, name: &str) -> Result<Value> {
        let body = self.get_json(token, path).await?;
        extract_resource(body, name)
            .ok_or_else(|| Error::Decode(format!("response has no fantasy_content.{name}")))
    }
}

impl FantasyApi for YahooFantasyClient {
    fn user_games<'a>(&'a self, token: &'a AccessToken) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            let users = self
                .resource(token, "users;use_login=1/games", "users")
                .await?;
            match users {
                Value::Array(mut list) if !list.is_empty() => Ok(list.swap_remove(0)),
                _ => Err(Error::Decode("no user in response".to_string())),
            }
        })
    }

    fn leagues<'a>(
        &'a self,
        token: &'a AccessToken,
        keys: &'a [LeagueKey],
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            // An empty `league_keys=` is rejected upstream
            if keys.is_empty() {
                debug!("no league keys requested, skipping provider call");
                return Ok(Value::Array(Vec::new()));
            }
            let joined = keys
                .iter()
                .map(LeagueKey::as_str)
                .collect::<Vec<_>>()
                .join(",");
            self.resource(token, &format!("leagues;league_keys={joined}"), "leagues")
                .await
        })
    }

    fn league_players<'a>(
        &'a self,
        token: &'a AccessToken,
        league: &'a LeagueKey,
        filters: &'a PlayerFilters,
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            let path = format!("league/{league}/players{}", filters.to_matrix_params());
            self.resource(token, &path, "league").await
        })
    }

    fn draft_results<'a>(
        &'a self,
        token: &'a AccessToken,
        league: &'a LeagueKey,
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            self.resource(token, &format!("league/{league}/draftresults"), "league")
                .await
        })
    }

    fn league_teams<'a>(
        &'a self,
        token: &'a AccessToken,
        league: &'a LeagueKey,
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            self.resource(token, &format!("league/{league}/teams"), "league")
                .await
        })
    }

    fn team_roster<'a>(&'a self, token: &'a AccessToken, team: &'a TeamKey) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            let team = self
                .resource(token, &format!("team/{team}/roster"), "team")
                .await?;
            Ok(lift_roster(team))
        })
    }
}
