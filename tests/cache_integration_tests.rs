//! Integration Tests for the public cache API
//!
//! Exercises the cache from many threads, against the real clock, and
//! together with the sweep task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, sleep};
use std::time::Duration;

use bytes::Bytes;
use expiring_cache::cache::{CopyCodec, ManualClock};
use expiring_cache::load::{run_get_load, run_set_load};
use expiring_cache::{spawn_sweep_task, ExpiringCache};

// == End-to-End ==

#[test]
fn test_set_get_expire_sweep_scenario() {
    let cache = ExpiringCache::new();

    cache.set("a", vec![0x01u8, 0x02], Duration::from_millis(100));
    assert_eq!(cache.get("a"), Some(Bytes::from_static(&[0x01, 0x02])));

    sleep(Duration::from_millis(150));

    assert!(cache.get("a").is_none());
    assert!(cache.is_resident("a"), "Get must not remove expired entries");

    cache.sweep();
    assert!(!cache.is_resident("a"));
    assert_eq!(cache.len(), 0);
}

// == Concurrency ==

#[test]
fn test_concurrent_sets_then_gets_on_distinct_keys() {
    const THREADS: usize = 32;
    let cache = ExpiringCache::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let writers: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.set(format!("key{}", i), format!("value{}", i), Duration::from_secs(60));
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let readers: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get(&format!("key{}", i)) == Some(Bytes::from(format!("value{}", i)))
            })
        })
        .collect();
    let hits = readers
        .into_iter()
        .map(|reader| reader.join().unwrap())
        .filter(|&hit| hit)
        .count();

    assert_eq!(hits, THREADS);
    assert_eq!(cache.len(), THREADS);
}

#[test]
fn test_sweep_racing_refresh_never_loses_update() {
    let clock = ManualClock::new();
    let cache = ExpiringCache::with_clock(clock.clone());

    for round in 0..200 {
        let key = format!("k{}", round);
        cache.set(key.clone(), "short", Duration::from_millis(1));
        clock.advance(Duration::from_millis(2));

        let sweeper = {
            let cache = cache.clone();
            thread::spawn(move || cache.sweep())
        };
        cache.set(key.clone(), "long", Duration::from_secs(3600));
        sweeper.join().unwrap();

        assert_eq!(cache.get(&key).unwrap(), "long", "round {}", round);
    }
}

#[test]
fn test_readers_and_writers_with_background_sweeps() {
    let cache = ExpiringCache::new();
    let stop = Arc::new(AtomicBool::new(false));

    let sweeper = {
        let cache = cache.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                cache.sweep();
                thread::yield_now();
            }
        })
    };

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("t{}-{}", t, i);
                    cache.set(key.clone(), vec![t as u8; 16], Duration::from_secs(60));
                    assert_eq!(cache.get(&key).unwrap(), vec![t as u8; 16]);
                    // Short-lived noise for the sweeper to reclaim.
                    cache.set(format!("tmp{}-{}", t, i), "x", Duration::ZERO);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    sweeper.join().unwrap();

    cache.sweep();
    assert_eq!(cache.len(), 8 * 500);
}

// == Load Harness ==

#[test]
fn test_load_harness_round_trip_with_copy_codec() {
    let cache = ExpiringCache::with_codec(CopyCodec);

    let stop = AtomicBool::new(false);

    let set = run_set_load(&cache, 10_000, 8, Duration::from_secs(600), &stop);
    let get = run_get_load(&cache, 10_000, 8, &stop);

    assert_eq!(set.hits, 10_000);
    assert_eq!(get.hits, 10_000);
    assert_eq!(cache.stats().hits, 10_000);
}

// == Sweep Task ==

#[tokio::test]
async fn test_sweep_task_reclaims_unread_keys() {
    let cache = ExpiringCache::new();
    for i in 0..100 {
        cache.set(format!("short{}", i), "v", Duration::from_millis(20));
    }
    cache.set("keeper", "v", Duration::from_secs(60));

    let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.abort();

    assert_eq!(cache.len(), 1);
    assert!(cache.is_resident("keeper"));
    assert_eq!(cache.stats().expired_removed, 100);
}
