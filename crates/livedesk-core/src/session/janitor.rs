//! Periodic sweep of idle chat sessions.
//!
//! Sessions idle for more than 24 hours are dropped once an hour. The
//! sweep shares no lock with request handlers beyond the store's
//! per-entry locks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::session::SessionStore;

/// Idle time after which a session is removed.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

/// Interval between sweeps.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Run the janitor until the token is cancelled.
pub async fn run(store: Arc<SessionStore>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(SWEEP_PERIOD);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let now = Utc::now().timestamp_millis();
                let removed = store.sweep_idle(now, IDLE_THRESHOLD.as_millis() as i64);
                if removed > 0 {
                    tracing::info!(removed, remaining = store.len(), "swept idle chat sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_janitor_stops_on_cancel() {
        let store = Arc::new(SessionStore::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(Arc::clone(&store), cancel.clone()));

        cancel.cancel();
        handle.await.unwrap();
    }
}
