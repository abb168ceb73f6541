//! Authenticated proxy endpoints
//!
//! Each handler makes exactly one provider call with the caller's token and
//! reshapes the result. `BoundToken` rejects unauthenticated requests with
//! 401 before any handler body runs.

use axum::Json;
use axum::extract::{Path, Query, State};
use fantasy_api::{PlayerFilters, TeamKey};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::binder::BoundToken;
use crate::error::GatewayError;
use crate::state::AppState;

/// Query parameters for the free-agent listing
#[derive(Debug, Deserialize)]
pub struct FreeAgentsQuery {
    pub count: Option<String>,
}

/// Parse `count`, defaulting to `PlayerFilters::DEFAULT_COUNT`.
fn parse_count(raw: Option<&str>) -> Result<u32, GatewayError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(PlayerFilters::DEFAULT_COUNT);
    };
    match raw.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(GatewayError::InvalidRequest(format!(
            "count must be a positive integer, got: {raw}"
        ))),
    }
}

/// Take a list-shaped field out of a provider payload; absent or null
/// becomes an empty array.
pub fn list_field(payload: Value, field: &str) -> Value {
    match payload {
        Value::Object(mut map) => match map.remove(field) {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(value) => value,
        },
        _ => Value::Array(Vec::new()),
    }
}

/// GET /api/user/profile
pub async fn user_profile(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
) -> Result<Json<Value>, GatewayError> {
    let payload = state
        .api
        .user_games(&token)
        .await
        .map_err(|e| GatewayError::upstream("user profile", e))?;
    Ok(Json(payload))
}

/// GET /api/leagues
pub async fn leagues(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
) -> Result<Json<Value>, GatewayError> {
    debug!(leagues = state.leagues.len(), "fetching configured leagues");
    let payload = state
        .api
        .leagues(&token, &state.leagues)
        .await
        .map_err(|e| GatewayError::upstream("leagues", e))?;
    Ok(Json(payload))
}

/// GET /api/leagues/{league_key}/free-agents?count=N
pub async fn free_agents(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
    Path(league_id): Path<String>,
    Query(query): Query<FreeAgentsQuery>,
) -> Result<Json<Value>, GatewayError> {
    let count = parse_count(query.count.as_deref())?;
    let league = state.league_key(&league_id);
    let filters = PlayerFilters::free_agents(count);
    debug!(league = %league, count, "fetching free agents");

    let payload = state
        .api
        .league_players(&token, &league, &filters)
        .await
        .map_err(|e| GatewayError::upstream("free agents", e))?;
    Ok(Json(list_field(payload, "players")))
}

/// GET /api/leagues/{league_key}/draft-results
pub async fn draft_results(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
    Path(league_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let league = state.league_key(&league_id);
    let payload = state
        .api
        .draft_results(&token, &league)
        .await
        .map_err(|e| GatewayError::upstream("draft results", e))?;
    Ok(Json(list_field(payload, "draft_results")))
}

/// GET /api/leagues/{league_key}/teams
pub async fn teams(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
    Path(league_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let league = state.league_key(&league_id);
    let payload = state
        .api
        .league_teams(&token, &league)
        .await
        .map_err(|e| GatewayError::upstream("teams", e))?;
    Ok(Json(list_field(payload, "teams")))
}

/// GET /api/leagues/{league_key}/teams/{team_key}/roster
///
/// The team key already embeds the league, so only it is sent upstream.
pub async fn roster(
    State(state): State<AppState>,
    BoundToken(token): BoundToken,
    Path((league_id, team_key)): Path<(String, String)>,
) -> Result<Json<Value>, GatewayError> {
    let team = TeamKey::new(team_key);
    debug!(league = %league_id, team = %team, "fetching roster");
    let payload = state
        .api
        .team_roster(&token, &team)
        .await
        .map_err(|e| GatewayError::upstream("roster", e))?;
    Ok(Json(list_field(payload, "roster")))
}
