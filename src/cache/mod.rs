//! Cache Module
//!
//! Provides the in-memory expiring cache, its entry type, clocks and value codecs.

mod clock;
mod codec;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{CodecKind, CopyCodec, IdentityCodec, ValueCodec};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ExpiringCache;
