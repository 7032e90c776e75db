//! Background Tasks Module
//!
//! Periodic drivers that run alongside the cache.
//!
//! # Tasks
//! - Sweep: removes expired cache entries at a fixed interval

mod sweep;

pub use sweep::{spawn_sweep_task, MIN_SWEEP_INTERVAL};
