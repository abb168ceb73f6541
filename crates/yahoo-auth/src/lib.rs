//! Yahoo OAuth 2.0 authentication adapter
//!
//! Wraps the two halves of the authorization-code handshake used by the
//! gateway:
//! 1. `OAuthClient::authorization_url()` builds the consent-screen redirect
//! 2. `OAuthClient::exchange_code()` trades the callback `code` for tokens
//!
//! Token refresh and persistent credential storage are deliberately absent;
//! tokens live only in the caller's session.

pub mod client;
pub mod constants;
pub mod error;
pub mod token;

pub use client::{OAuthClient, OAuthEndpoints};
pub use constants::*;
pub use error::{Error, Result};
pub use token::TokenResponse;
