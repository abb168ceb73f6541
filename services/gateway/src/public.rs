//! Unauthenticated player projections
//!
//! Bypasses `FantasyApi`: the gateway issues the GET itself against the
//! public read API and re-parses the body before forwarding it.

use axum::Json;
use axum::extract::{Path, State};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::GatewayError;
use crate::state::AppState;

/// Stat groups requested for every player.
const PLAYER_OUT: &str = "projected_stats,average_stats";

/// Public players URL for a league key.
fn players_url(base: &str, league_key: &str) -> String {
    format!(
        "{}/league/{league_key}/players;out={PLAYER_OUT}?format=json",
        base.trim_end_matches('/')
    )
}

/// GET /api/leagues/{league_key}/players
pub async fn league_players(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let league = state.league_key(&league_id);
    let url = players_url(&state.public_api_base_url, league.as_str());
    debug!(url = %url, "fetching public player data");

    let response = state
        .http
        .get(&url)
        .send()
        .await
        .map_err(GatewayError::PublicRequest)?;

    let status = response.status();
    if status != StatusCode::OK {
        // Drain so the connection can be reused; the body is never parsed
        if let Err(e) = response.bytes().await {
            debug!(error = %e, "failed to drain upstream error body");
        }
        return Err(GatewayError::UpstreamStatus(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(GatewayError::PublicRequest)?;
    let payload = serde_json::from_slice(&body).map_err(GatewayError::Parse)?;
    Ok(Json(payload))
}
