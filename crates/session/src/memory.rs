//! In-process session store

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::store::{SessionData, SessionId, SessionStore, StoreFuture};

struct Entry {
    data: SessionData,
    expires_at: Instant,
}

/// Session store backed by a `HashMap` behind a tokio `RwLock`.
///
/// Records expire after `ttl` without a load or save.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl SessionStore for MemorySessionStore {
    fn load<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionData>> {
        Box::pin(async move {
            let mut sessions = self.sessions.write().await;
            let now = Instant::now();
            match sessions.get_mut(id) {
                Some(entry) if entry.expires_at > now => {
                    entry.expires_at = now + self.ttl;
                    Ok(Some(entry.data.clone()))
                }
                Some(_) => {
                    sessions.remove(id);
                    debug!(session = %id, "session expired");
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn save<'a>(&'a self, id: &'a SessionId, data: SessionData) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let entry = Entry {
                data,
                expires_at: Instant::now() + self.ttl,
            };
            self.sessions.write().await.insert(id.clone(), entry);
            Ok(())
        })
    }

    fn destroy<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if self.sessions.write().await.remove(id).is_some() {
                debug!(session = %id, "session destroyed");
            }
            Ok(())
        })
    }

    fn purge_expired(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            let now = Instant::now();
            sessions.retain(|_, entry| entry.expires_at > now);
            Ok(before - sessions.len())
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            let now = Instant::now();
            let sessions = self.sessions.read().await;
            Ok(sessions.values().filter(|e| e.expires_at > now).count())
        })
    }
}
