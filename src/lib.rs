//! Expiring Cache - an in-process key-value cache with TTL expiration
//!
//! Values are stored under string keys with a per-entry time-to-live.
//! Lookups never return expired values, and a periodic sweep reclaims
//! the memory held by entries that are never read again.

pub mod cache;
pub mod config;
pub mod error;
pub mod load;
pub mod tasks;

pub use cache::{CodecKind, ExpiringCache, ValueCodec};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
