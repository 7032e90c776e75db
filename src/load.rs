//! Load Module
//!
//! Drives concurrent `set`/`get` traffic against a cache and times it.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::cache::ExpiringCache;

/// Payload written for every key.
pub const LOAD_VALUE: &[u8] = b"some data";

/// Key written for index `i`.
pub fn load_key(i: usize) -> String {
    format!("key{}", i)
}

// == Load Report ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOperation {
    Set,
    Get,
}

/// Timing summary of one load run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub operation: LoadOperation,
    pub codec: String,
    pub keys: usize,
    pub workers: usize,
    /// Keys actually processed before the run finished or was stopped
    pub completed: usize,
    /// Lookups that returned a value; equal to `completed` for set runs
    pub hits: usize,
    /// Whether the stop flag cut the run short
    pub stopped: bool,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

impl LoadReport {
    fn new(
        cache: &ExpiringCache,
        operation: LoadOperation,
        keys: usize,
        workers: usize,
        outcome: RunOutcome,
    ) -> Self {
        let secs = outcome.elapsed.as_secs_f64();
        Self {
            operation,
            codec: cache.codec_name().to_string(),
            keys,
            workers,
            completed: outcome.completed,
            hits: outcome.succeeded,
            stopped: outcome.completed < keys,
            elapsed_ms: secs * 1000.0,
            ops_per_sec: if secs > 0.0 {
                outcome.completed as f64 / secs
            } else {
                0.0
            },
        }
    }
}

// == Runs ==
/// Writes `keys` distinct keys with `ttl`, spread over `workers` threads.
///
/// Workers stop taking new keys once `stop` is set.
pub fn run_set_load(
    cache: &ExpiringCache,
    keys: usize,
    workers: usize,
    ttl: Duration,
    stop: &AtomicBool,
) -> LoadReport {
    let value = Bytes::from_static(LOAD_VALUE);
    let outcome = run_partitioned(keys, workers, stop, |i| {
        cache.set(load_key(i), value.clone(), ttl);
        true
    });

    debug!(keys, workers, completed = outcome.completed, "set load finished");
    LoadReport::new(cache, LoadOperation::Set, keys, workers, outcome)
}

/// Reads back the keys written by [`run_set_load`], counting hits.
pub fn run_get_load(
    cache: &ExpiringCache,
    keys: usize,
    workers: usize,
    stop: &AtomicBool,
) -> LoadReport {
    let outcome = run_partitioned(keys, workers, stop, |i| {
        cache
            .get(&load_key(i))
            .is_some_and(|value| value == LOAD_VALUE)
    });

    debug!(keys, workers, hits = outcome.succeeded, "get load finished");
    LoadReport::new(cache, LoadOperation::Get, keys, workers, outcome)
}

struct RunOutcome {
    completed: usize,
    succeeded: usize,
    elapsed: Duration,
}

/// Runs `op` for every index in `0..keys`, striped across `workers` scoped
/// threads, until done or until `stop` is set.
fn run_partitioned<F>(keys: usize, workers: usize, stop: &AtomicBool, op: F) -> RunOutcome
where
    F: Fn(usize) -> bool + Sync,
{
    let workers = workers.max(1);
    let op = &op;
    let start = Instant::now();

    let (completed, succeeded) = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || {
                    let mut completed = 0usize;
                    let mut succeeded = 0usize;
                    for i in (worker..keys).step_by(workers) {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        completed += 1;
                        if op(i) {
                            succeeded += 1;
                        }
                    }
                    (completed, succeeded)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .fold((0, 0), |(c, s), (wc, ws)| (c + wc, s + ws))
    });

    RunOutcome {
        completed,
        succeeded,
        elapsed: start.elapsed(),
    }
}
