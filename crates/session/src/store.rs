//! Session record types and the storage trait

use common::Secret;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{Error, Result};

/// Opaque session identifier (UUIDv4, simple form).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Parse an id read back from a cookie.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.len() == 32 && raw.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(Error::InvalidId(format!("{} chars", raw.len())));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session ids are bearer credentials; only a prefix is ever logged.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", &self.0[..self.0.len().min(8)])
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", &self.0[..self.0.len().min(8)])
    }
}

/// Contents of one session. An empty record is an unauthenticated session.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub access_token: Option<Secret<String>>,
    pub refresh_token: Option<Secret<String>>,
}

impl SessionData {
    /// Record holding a freshly exchanged token pair.
    pub fn with_tokens(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(Secret::new(access_token)),
            refresh_token: refresh_token.map(Secret::new),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Boxed future returned by `SessionStore` methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage backend for session records.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn SessionStore>`).
pub trait SessionStore: Send + Sync {
    /// Fetch a live session, or `None` if unknown or expired.
    fn load<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionData>>;

    /// Create or overwrite a session record.
    fn save<'a>(&'a self, id: &'a SessionId, data: SessionData) -> StoreFuture<'a, ()>;

    /// Remove the whole session record. Destroying an unknown id succeeds.
    fn destroy<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()>;

    /// Drop expired records, returning how many were removed.
    fn purge_expired(&self) -> StoreFuture<'_, usize>;

    /// Number of live sessions, for the health endpoint.
    fn count(&self) -> StoreFuture<'_, usize>;
}
