use std::time::Duration;

use schoolgate_core::{Clock, RevocationStore};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Delete deny-list entries that can no longer match a live token.
pub async fn purge_revocations<R, K>(store: &R, clock: &K) -> u64
where
    R: RevocationStore,
    K: Clock,
{
    match store.purge_expired(clock.now()).await {
        Ok(purged) => {
            if purged > 0 {
                tracing::info!(purged, "Purged expired revocation entries");
            }
            purged
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to purge revocation entries");
            0
        }
    }
}

/// Run [`purge_revocations`] every `period`, starting immediately. Returns `None` when
/// the period is zero, which disables housekeeping.
pub fn spawn_revocation_purge<R, K>(store: R, clock: K, period: Duration) -> Option<JoinHandle<()>>
where
    R: RevocationStore + 'static,
    K: Clock + 'static,
{
    if period.is_zero() {
        tracing::info!("Revocation housekeeping disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            purge_revocations(&store, &clock).await;
        }
    }))
}
