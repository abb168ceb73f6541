//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The Yahoo client secret and the session cookie secret are loaded from
//! env vars (`YAHOO_CLIENT_SECRET`, `SESSION_SECRET`) or from the
//! `*_file` paths, never stored in the TOML body.

use common::{Secret, resolve_secret};
use fantasy_api::LeagueKey;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Minimum session secret length; the cookie encryption key is derived
/// from the first 64 bytes.
pub const MIN_SESSION_SECRET_BYTES: usize = 64;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub yahoo: YahooConfig,
    #[serde(default)]
    pub leagues: Vec<LeagueEntry>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Provider application credentials and endpoints
#[derive(Debug, Deserialize)]
pub struct YahooConfig {
    /// Consumer key
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the consumer secret (alternative to YAHOO_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    /// OAuth callback URL registered with the provider
    pub redirect_uri: String,
    /// Sport tag prefixed onto numeric league ids
    #[serde(default = "default_sport")]
    pub sport: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_base_url")]
    pub public_api_base_url: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

/// A league the `/api/leagues` endpoint reports on
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntry {
    /// Numeric league id
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Session cookie and store settings
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle lifetime of a session
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(skip)]
    pub secret: Option<Secret<String>>,
    /// Path to a file containing the cookie secret (alternative to SESSION_SECRET)
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
            secure_cookies: default_secure_cookies(),
            sweep_interval_secs: default_sweep_interval(),
            secret: None,
            secret_file: None,
        }
    }
}

fn default_max_connections() -> usize {
    1000
}

fn default_sport() -> String {
    "nfl".to_string()
}

fn default_api_base_url() -> String {
    fantasy_api::client::API_BASE_URL.to_string()
}

fn default_authorize_url() -> String {
    yahoo_auth::AUTHORIZE_ENDPOINT.to_string()
}

fn default_token_url() -> String {
    yahoo_auth::TOKEN_ENDPOINT.to_string()
}

fn default_cookie_name() -> String {
    "fantasy_session".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_secure_cookies() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    300
}

fn require_http_url(field: &str, value: &str) -> common::Result<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(common::Error::Config(format!(
            "{field} must start with http:// or https://, got: {value}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file, then resolve secrets.
    ///
    /// Secret resolution order (each): env var, then `*_file` path.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        config.yahoo.client_secret = resolve_secret(
            "YAHOO_CLIENT_SECRET",
            config.yahoo.client_secret_file.as_deref(),
        )?;
        if config.yahoo.client_secret.is_none() {
            return Err(common::Error::Config(
                "Yahoo client secret missing: set YAHOO_CLIENT_SECRET or yahoo.client_secret_file"
                    .into(),
            ));
        }

        config.session.secret =
            resolve_secret("SESSION_SECRET", config.session.secret_file.as_deref())?;
        match &config.session.secret {
            None => {
                return Err(common::Error::Config(
                    "session secret missing: set SESSION_SECRET or session.secret_file".into(),
                ));
            }
            Some(secret) if secret.expose().len() < MIN_SESSION_SECRET_BYTES => {
                return Err(common::Error::Config(format!(
                    "session secret must be at least {MIN_SESSION_SECRET_BYTES} bytes"
                )));
            }
            Some(_) => {}
        }

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        require_http_url("yahoo.redirect_uri", &self.yahoo.redirect_uri)?;
        require_http_url("yahoo.api_base_url", &self.yahoo.api_base_url)?;
        require_http_url("yahoo.public_api_base_url", &self.yahoo.public_api_base_url)?;
        require_http_url("yahoo.authorize_url", &self.yahoo.authorize_url)?;
        require_http_url("yahoo.token_url", &self.yahoo.token_url)?;

        if self.yahoo.client_id.trim().is_empty() {
            return Err(common::Error::Config("yahoo.client_id must not be empty".into()));
        }
        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.session.ttl_secs == 0 {
            return Err(common::Error::Config(
                "session.ttl_secs must be greater than 0".into(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(common::Error::Config(
                "session.sweep_interval_secs must be greater than 0".into(),
            ));
        }
        if let Some(entry) = self.leagues.iter().find(|l| l.key.trim().is_empty()) {
            return Err(common::Error::Config(format!(
                "league entry has an empty key: {entry:?}"
            )));
        }
        Ok(())
    }

    /// League keys for every configured league entry.
    pub fn league_keys(&self) -> Vec<LeagueKey> {
        self.leagues
            .iter()
            .map(|entry| LeagueKey::new(&self.yahoo.sport, entry.key.trim()))
            .collect()
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("fantasy-gateway.toml")
    }
}
