//! Configuration Module
//!
//! Loads the load driver's settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CodecKind;
use crate::error::{CacheError, Result};

/// Load driver configuration.
///
/// The cache itself takes no configuration; these values control the
/// sweep period and the workload the binary runs against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interval in milliseconds between sweep passes
    pub sweep_interval_ms: u64,
    /// Number of distinct keys written and then read
    pub load_keys: usize,
    /// TTL in seconds given to every written key
    pub load_ttl_secs: u64,
    /// Worker threads used by the load run
    pub load_workers: usize,
    /// Codecs to benchmark, in order
    pub codecs: Vec<CodecKind>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL_MS` - Sweep period in milliseconds (default: 1000)
    /// - `LOAD_KEYS` - Number of keys (default: 1000000)
    /// - `LOAD_TTL_SECS` - TTL per key in seconds (default: 600)
    /// - `LOAD_WORKERS` - Worker threads (default: available parallelism)
    /// - `VALUE_CODEC` - `identity` or `copy` (default: run both)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            sweep_interval_ms: parse_var(
                &lookup,
                "SWEEP_INTERVAL_MS",
                defaults.sweep_interval_ms,
            )?,
            load_keys: parse_var(&lookup, "LOAD_KEYS", defaults.load_keys)?,
            load_ttl_secs: parse_var(&lookup, "LOAD_TTL_SECS", defaults.load_ttl_secs)?,
            load_workers: parse_var(&lookup, "LOAD_WORKERS", defaults.load_workers)?,
            codecs: match lookup("VALUE_CODEC") {
                Some(name) => vec![name.parse()?],
                None => defaults.codecs,
            },
        };

        if config.sweep_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "SWEEP_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        if config.load_workers == 0 {
            return Err(CacheError::InvalidConfig(
                "LOAD_WORKERS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn load_ttl(&self) -> Duration {
        Duration::from_secs(self.load_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1000,
            load_keys: 1_000_000,
            load_ttl_secs: 600,
            load_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            codecs: CodecKind::ALL.to_vec(),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig(format!("{}={}", name, raw))),
        None => Ok(default),
    }
}
