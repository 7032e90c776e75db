//! Cache Store Module
//!
//! Main cache engine: a reader-writer locked map with per-entry deadlines
//! and an explicit sweep that reclaims expired entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Clock, IdentityCodec, SystemClock, ValueCodec};

struct Shared {
    entries: RwLock<HashMap<String, CacheEntry>>,
    codec: Box<dyn ValueCodec>,
    clock: Box<dyn Clock>,
    stats: StatsCounters,
}

// == Expiring Cache ==
/// Thread-safe key-value cache whose entries expire after a per-entry TTL.
///
/// Cloning is cheap and every clone refers to the same storage, so one cache
/// can be handed to any number of threads or tasks.
///
/// Lookups take a shared lock and never mutate the map: an expired entry is
/// reported as a miss but stays resident until [`ExpiringCache::sweep`]
/// removes it.
#[derive(Clone)]
pub struct ExpiringCache {
    shared: Arc<Shared>,
}

impl ExpiringCache {
    // == Constructors ==
    /// Creates an empty cache with the identity codec and the system clock.
    pub fn new() -> Self {
        Self::with_codec_and_clock(IdentityCodec, SystemClock)
    }

    /// Creates an empty cache that encodes every value with `codec`.
    pub fn with_codec(codec: impl ValueCodec + 'static) -> Self {
        Self::with_codec_and_clock(codec, SystemClock)
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::with_codec_and_clock(IdentityCodec, clock)
    }

    /// Creates an empty cache with both a custom codec and a custom clock.
    pub fn with_codec_and_clock(
        codec: impl ValueCodec + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self::from_parts(Box::new(codec), Box::new(clock))
    }

    /// Creates an empty cache from already boxed collaborators.
    pub fn from_parts(codec: Box<dyn ValueCodec>, clock: Box<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                codec,
                clock,
                stats: StatsCounters::default(),
            }),
        }
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Any existing entry for `key` is replaced, including its deadline. A
    /// zero `ttl` stores an entry that is already expired: lookups miss and
    /// the next sweep removes it. A `ttl` whose deadline cannot be
    /// represented, such as `Duration::MAX`, never expires.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl: Duration) {
        let encoded = self.shared.codec.encode(value.into());
        let key = key.into();

        let mut entries = self.shared.entries.write();
        let entry = CacheEntry::new(encoded, self.shared.clock.now(), ttl);
        entries.insert(key, entry);
        drop(entries);

        self.shared.stats.record_set();
    }

    /// Stores `value` under `key` with an absolute deadline.
    ///
    /// A deadline at or before the current instant stores an already expired
    /// entry, the same as a non-positive TTL.
    pub fn set_until(&self, key: impl Into<String>, value: impl Into<Bytes>, deadline: Instant) {
        let encoded = self.shared.codec.encode(value.into());
        let key = key.into();

        self.shared
            .entries
            .write()
            .insert(key, CacheEntry::with_deadline(encoded, deadline));

        self.shared.stats.record_set();
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    ///
    /// Returns `None` when the key is absent or its deadline has passed,
    /// whether or not a sweep has run. The returned `Bytes` is an immutable
    /// handle: later writes to the cache do not change it.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let value = {
            let entries = self.shared.entries.read();
            let now = self.shared.clock.now();
            entries
                .get(key)
                .filter(|entry| !entry.is_expired_at(now))
                .map(|entry| entry.value.clone())
        };

        match value {
            Some(_) => self.shared.stats.record_hit(),
            None => self.shared.stats.record_miss(),
        }
        value
    }

    // == Sweep ==
    /// Physically removes every expired entry.
    ///
    /// The exclusive lock is held for the whole scan and expiry is evaluated
    /// under it, so an entry refreshed by a concurrent `set` is never
    /// removed. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let (removed, remaining) = {
            let mut entries = self.shared.entries.write();
            let now = self.shared.clock.now();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            (before - entries.len(), entries.len())
        };

        self.shared.stats.record_sweep(removed);
        if removed > 0 {
            debug!(removed, remaining, "sweep removed expired entries");
        } else {
            trace!(remaining, "sweep found no expired entries");
        }
        removed
    }

    // == Introspection ==
    /// Remaining lifetime of the live entry under `key`.
    ///
    /// Entries that never expire report `Duration::MAX`.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.shared.entries.read();
        let now = self.shared.clock.now();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now).unwrap_or(Duration::MAX))
    }

    /// Whether `key` is physically stored, expired or not.
    pub fn is_resident(&self, key: &str) -> bool {
        self.shared.entries.read().contains_key(key)
    }

    /// Number of physically stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }

    /// Name of the configured value codec.
    pub fn codec_name(&self) -> &str {
        self.shared.codec.name()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot(self.len())
    }
}

impl Default for ExpiringCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpiringCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("codec", &self.codec_name())
            .field("clock", &self.shared.clock)
            .field("entries", &self.len())
            .finish()
    }
}
