//! Application-level OAuth client
//!
//! Holds the consumer key/secret and callback URL configured at process
//! start. It carries no per-user state: the tokens returned by
//! `exchange_code` belong to the caller and are stored in their session.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;
use reqwest::Url;
use tracing::{debug, warn};

use crate::constants::{AUTHORIZE_ENDPOINT, CONSENT_LANGUAGE, TOKEN_ENDPOINT};
use crate::error::{Error, Result};
use crate::token::TokenResponse;

/// Authorization and token endpoint locations. Overridable for tests and
/// staging environments.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub authorize: String,
    pub token: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorize: AUTHORIZE_ENDPOINT.to_string(),
            token: TOKEN_ENDPOINT.to_string(),
        }
    }
}

/// OAuth client configured with application credentials.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    endpoints: OAuthEndpoints,
}

impl OAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret<String>,
        redirect_uri: impl Into<String>,
        endpoints: OAuthEndpoints,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            endpoints,
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Consent-screen URL the browser is redirected to.
    pub fn authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &self.endpoints.authorize,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("language", CONSENT_LANGUAGE),
            ],
        )
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.endpoints.authorize)))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// The client authenticates with HTTP Basic (`client_id:client_secret`).
    /// Non-success responses keep the raw body in `Error::TokenEndpoint`.
    pub async fn exchange_code(
        &self,
        http: &reqwest::Client,
        code: &str,
    ) -> Result<TokenResponse> {
        let credentials = format!("{}:{}", self.client_id, self.client_secret.expose());
        let basic = format!("Basic {}", STANDARD.encode(credentials));

        let response = http
            .post(&self.endpoints.token)
            .header(reqwest::header::AUTHORIZATION, basic)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(status = status.as_u16(), "token endpoint rejected authorization code");
            return Err(Error::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;
        debug!(expires_in = ?token.expires_in, "authorization code exchanged");
        Ok(token)
    }
}
