//! Provider resource identifiers and the per-call bearer token

use common::Secret;
use std::fmt;

/// League key: `<sport>.l.<league id>`, e.g. `nfl.l.123`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueKey(String);

impl LeagueKey {
    /// Compose a league key from a sport tag and a numeric league id.
    pub fn new(sport: &str, league_id: &str) -> Self {
        Self(format!("{sport}.l.{league_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team key, e.g. `nfl.l.123.t.4`. Self-contained: it already embeds the
/// league key and is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamKey(String);

impl TeamKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller's OAuth access token, scoped to one API call.
#[derive(Debug, Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose())
    }
}
