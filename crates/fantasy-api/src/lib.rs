//! Yahoo Fantasy Sports API client
//!
//! Defines the `FantasyApi` trait that decouples the gateway's endpoint
//! handlers from the transport. `YahooFantasyClient` implements it over
//! reqwest; tests substitute recording doubles.
//!
//! Every call takes the caller's `AccessToken` as an explicit parameter.
//! Clients hold no per-user state, so one instance is safely shared by
//! concurrent requests from different sessions.

pub mod client;
pub mod keys;
pub mod reshape;

pub use client::YahooFantasyClient;
pub use keys::{AccessToken, LeagueKey, TeamKey};

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Errors from provider API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    Decode(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed future returned by `FantasyApi` methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Filters for the players-by-league capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFilters {
    /// Ownership status, e.g. `FA` for free agents
    pub status: String,
    /// Sort criterion, e.g. `ADP` for average draft position
    pub sort: String,
    pub count: u32,
}

impl PlayerFilters {
    /// Default page size for free-agent listings.
    pub const DEFAULT_COUNT: u32 = 50;

    /// Unrostered players ordered by average draft position.
    pub fn free_agents(count: u32) -> Self {
        Self {
            status: "FA".to_string(),
            sort: "ADP".to_string(),
            count,
        }
    }

    /// Matrix parameters in the provider's `;key=value` URL syntax.
    pub fn to_matrix_params(&self) -> String {
        format!(
            ";status={};sort={};count={}",
            self.status, self.sort, self.count
        )
    }
}

/// The curated subset of the provider API re-exposed by the gateway.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn FantasyApi>`).
pub trait FantasyApi: Send + Sync {
    /// The logged-in user with their games.
    fn user_games<'a>(&'a self, token: &'a AccessToken) -> ApiFuture<'a, Value>;

    /// Metadata for each of the given leagues.
    fn leagues<'a>(&'a self, token: &'a AccessToken, keys: &'a [LeagueKey])
    -> ApiFuture<'a, Value>;

    /// A league with its `players` collection narrowed by `filters`.
    fn league_players<'a>(
        &'a self,
        token: &'a AccessToken,
        league: &'a LeagueKey,
        filters: &'a PlayerFilters,
    ) -> ApiFuture<'a, Value>;

    /// A league with its `draft_results` collection.
    fn draft_results<'a>(&'a self, token: &'a AccessToken, league: &'a LeagueKey)
    -> ApiFuture<'a, Value>;

    /// A league with its `teams` collection.
    fn league_teams<'a>(&'a self, token: &'a AccessToken, league: &'a LeagueKey)
    -> ApiFuture<'a, Value>;

    /// A team with its `roster` players.
    fn team_roster<'a>(&'a self, token: &'a AccessToken, team: &'a TeamKey) -> ApiFuture<'a, Value>;
}
