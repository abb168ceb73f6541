//! Server-side session storage
//!
//! One record per browser session, keyed by an opaque `SessionId` carried
//! in the session cookie. Records hold the OAuth token pair written by the
//! callback handler and are destroyed wholesale on logout.
//!
//! Expiry is idle-based: every successful load pushes the deadline out by
//! the configured TTL. Expired records are invisible to `load` and are
//! reclaimed by the background sweeper.

pub mod error;
pub mod memory;
pub mod store;
pub mod sweeper;

pub use error::{Error, Result};
pub use memory::MemorySessionStore;
pub use store::{SessionData, SessionId, SessionStore, StoreFuture};
pub use sweeper::spawn_sweeper;
