//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an expiry deadline.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// A stored value and the instant after which it is logically dead.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value (codec output)
    pub value: Bytes,
    /// Expiration deadline, None = the TTL reaches past the clock's range
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` after `now`.
    ///
    /// A zero `ttl` yields an entry that is already expired at `now`. A
    /// `ttl` too large to represent as an instant never expires.
    pub fn new(value: Bytes, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    /// Creates an entry with an explicit deadline, which may lie in the past.
    pub fn with_deadline(value: Bytes, expires_at: Instant) -> Self {
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so the deadline instant
    /// itself already counts as expired.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }

    // == Time To Live ==
    /// Remaining lifetime at `now`.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` once expired
    /// - `Some(remaining)` while live
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|expires| expires.saturating_duration_since(now))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_live_before_deadline() {
        let now = Instant::now();
        let entry = CacheEntry::new(Bytes::from_static(b"v"), now, Duration::from_secs(60));

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_secs(59)));
        assert_eq!(entry.ttl_remaining_at(now), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_zero_ttl_is_expired() {
        let now = Instant::now();
        let entry = CacheEntry::new(Bytes::from_static(b"v"), now, Duration::ZERO);

        assert!(entry.is_expired_at(now));
        assert_eq!(entry.ttl_remaining_at(now), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new(Bytes::from_static(b"v"), now, Duration::from_millis(100));

        // Expired exactly at the deadline, not one tick before.
        assert!(!entry.is_expired_at(now + Duration::from_millis(99)));
        assert!(entry.is_expired_at(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_entry_with_past_deadline() {
        let now = Instant::now() + Duration::from_secs(10);
        let entry = CacheEntry::with_deadline(Bytes::new(), now - Duration::from_secs(5));

        assert!(entry.is_expired_at(now));
        assert_eq!(entry.ttl_remaining_at(now), Some(Duration::ZERO));
    }

    #[test]
    fn test_entry_unrepresentable_ttl_never_expires() {
        let now = Instant::now();
        let entry = CacheEntry::new(Bytes::from_static(b"v"), now, Duration::MAX);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(now + Duration::from_secs(365 * 24 * 3600)));
        assert_eq!(entry.ttl_remaining_at(now), None);
    }
}
