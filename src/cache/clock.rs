//! Clock Module
//!
//! Single time source used for every expiry computation and comparison.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// == Clock Trait ==
/// Source of "now" for the cache.
///
/// `set` computes deadlines and `get`/`sweep` compare against them using the
/// same clock, so a cache never mixes two time sources.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Monotonic wall-independent clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Furthest a [`ManualClock`] can be advanced (about a century).
const MAX_MANUAL_OFFSET: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Manual Clock ==
/// Clock that only moves when told to.
///
/// Clones share the same offset, so a test can hand one clone to the cache
/// and advance time through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Moves the clock forward by `by`.
    ///
    /// The total offset saturates at roughly a century.
    pub fn advance(&self, by: Duration) {
        let max_nanos = MAX_MANUAL_OFFSET.as_nanos() as u64;
        let step = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .offset_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(step).min(max_nanos))
            });
    }

    /// Total time this clock has been advanced.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        // The offset is capped, so this only fails on a clock origin at the
        // very end of the platform's range.
        self.origin
            .checked_add(self.elapsed())
            .unwrap_or(self.origin)
    }
}
