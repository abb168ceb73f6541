//! Token endpoint response

use serde::{Deserialize, Serialize};

/// Response from the Yahoo token endpoint for an authorization code grant.
///
/// `expires_in` is a delta in seconds. The gateway does not refresh tokens,
/// so the value is only logged.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Yahoo's stable user GUID, present on most grants
    #[serde(default)]
    pub xoauth_yahoo_guid: Option<String>,
}
