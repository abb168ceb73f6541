//! Background expiry sweep
//!
//! Expired sessions are already invisible to `load`; the sweeper reclaims
//! their memory so abandoned sessions do not accumulate.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::store::SessionStore;

/// Spawn a task that purges expired sessions every `interval`.
///
/// Returns a `JoinHandle` for the spawned task.
pub fn spawn_sweeper(
    store: Arc<dyn SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip the immediate first tick: the store was just created
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "purged expired sessions"),
                Err(e) => warn!(error = %e, "session sweep failed, will retry next cycle"),
            }
        }
    })
}
