//! Sweep Task
//!
//! Background task that periodically reclaims expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::ExpiringCache;

/// Shortest period the task will sweep at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that calls [`ExpiringCache::sweep`] every `interval`.
///
/// The cache never schedules itself; this task is the external driver. A
/// slow or missed tick only delays reclamation, since lookups check expiry
/// on their own.
///
/// Intervals shorter than [`MIN_SWEEP_INTERVAL`], including zero, are
/// raised to it.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = ExpiringCache::new();
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: ExpiringCache, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting sweep task");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.sweep();
            if removed > 0 {
                info!("Sweep: removed {} expired entries", removed);
            } else {
                debug!("Sweep: no expired entries found");
            }
        }
    })
}
