//! Yahoo OAuth constants
//!
//! Public endpoint locations for the Yahoo login service. The consumer key
//! and secret identifying the application are configuration, not constants.

/// Authorization endpoint (consent screen)
pub const AUTHORIZE_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/request_auth";

/// Token endpoint for authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Language hint passed to the consent screen
pub const CONSENT_LANGUAGE: &str = "en-us";
