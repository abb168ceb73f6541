//! Yahoo Fantasy OAuth Gateway
//!
//! Single-binary Rust service that:
//! 1. Runs the Yahoo OAuth handshake and keeps tokens in server-side sessions
//! 2. Proxies a curated set of Fantasy API reads with the caller's token
//! 3. Proxies unauthenticated player projections from the public read API

mod api;
mod auth;
mod binder;
mod config;
mod error;
mod extractor;
mod metrics;
mod public;
mod state;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum_extra::extract::cookie::Key;
use fantasy_api::YahooFantasyClient;
use session::{MemorySessionStore, SessionStore, spawn_sweeper};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yahoo_auth::{OAuthClient, OAuthEndpoints};

use crate::config::Config;
use crate::metrics::ServiceMetrics;
use crate::state::{AppState, CookieSettings};

/// Time allowed for in-flight requests to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the axum router with all routes and shared state.
///
/// Applies a concurrency limit layer based on `max_connections`.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/auth/yahoo", get(auth::begin))
        .route("/auth/yahoo/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/api/user/profile", get(api::user_profile))
        .route("/api/leagues", get(api::leagues))
        .route(
            "/api/leagues/{league_key}/free-agents",
            get(api::free_agents),
        )
        .route(
            "/api/leagues/{league_key}/draft-results",
            get(api::draft_results),
        )
        .route("/api/leagues/{league_key}/teams", get(api::teams))
        .route(
            "/api/leagues/{league_key}/teams/{team_key}/roster",
            get(api::roster),
        )
        .route(
            "/api/leagues/{league_key}/players",
            get(public::league_players),
        )
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics::track_requests,
        ))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting fantasy-gateway");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder()?;

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        sport = %config.yahoo.sport,
        leagues = config.leagues.len(),
        session_ttl_secs = config.session.ttl_secs,
        "configuration loaded"
    );
    if config.leagues.is_empty() {
        warn!("no [[leagues]] configured, /api/leagues will return an empty list");
    }
    for entry in &config.leagues {
        info!(key = %entry.key, name = entry.name.as_deref().unwrap_or(""), "league configured");
    }

    let session_secret = config
        .session
        .secret
        .as_ref()
        .context("session secret not resolved")?;
    let cookie_key = Key::try_from(session_secret.expose().as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;

    let client_secret = config
        .yahoo
        .client_secret
        .clone()
        .context("Yahoo client secret not resolved")?;

    let http = reqwest::Client::new();
    let oauth = OAuthClient::new(
        config.yahoo.client_id.clone(),
        client_secret,
        config.yahoo.redirect_uri.clone(),
        OAuthEndpoints {
            authorize: config.yahoo.authorize_url.clone(),
            token: config.yahoo.token_url.clone(),
        },
    );

    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(Duration::from_secs(
        config.session.ttl_secs,
    )));
    let sweeper = spawn_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
    );

    let metrics = ServiceMetrics::new();
    let app_state = AppState {
        api: Arc::new(YahooFantasyClient::new(
            http.clone(),
            config.yahoo.api_base_url.clone(),
        )),
        oauth: Arc::new(oauth),
        http,
        sessions,
        cookies: CookieSettings {
            key: cookie_key,
            name: config.session.cookie_name.clone(),
            secure: config.session.secure_cookies,
        },
        sport: config.yahoo.sport.clone(),
        leagues: Arc::new(config.league_keys()),
        public_api_base_url: config.yahoo.public_api_base_url.clone(),
        metrics: metrics.clone(),
        prometheus: prometheus_handle,
    };

    let app = build_router(app_state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timeout starts when the shutdown signal fires, not when the
    // server starts: notify the server to drain, then race it against the timer.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                requests_served = metrics.requests_total.load(Ordering::Relaxed),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    sweeper.abort();
    info!("shutdown complete");
    Ok(())
}

/// Landing response; logout and the OAuth callback redirect here.
async fn root_handler() -> &'static str {
    "Yahoo Fantasy gateway is running"
}

/// Health endpoint: status, uptime, request counters and live sessions.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.metrics.started_at.elapsed().as_secs();
    let requests = state.metrics.requests_total.load(Ordering::Relaxed);
    let errors = state.metrics.errors_total.load(Ordering::Relaxed);

    let (status_code, body) = match state.sessions.count().await {
        Ok(active) => (
            axum::http::StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "uptime_seconds": uptime,
                "requests_served": requests,
                "errors_total": errors,
                "active_sessions": active,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "session store unavailable for health check");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "degraded",
                    "uptime_seconds": uptime,
                    "requests_served": requests,
                    "errors_total": errors,
                    "active_sessions": null,
                }),
            )
        }
    };

    (
        status_code,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
