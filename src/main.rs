//! Expiring Cache load driver
//!
//! Fills a cache from many threads, reads every key back and reports the
//! timings, once per configured value codec.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::cache::SystemClock;
use expiring_cache::load::{run_get_load, run_set_load, LoadReport};
use expiring_cache::{spawn_sweep_task, CodecKind, Config, ExpiringCache};

/// Main entry point for the load driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. For each codec: build a cache, start its sweep task, run set then get load
/// 4. Stop the workers early on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: keys={}, ttl={}s, workers={}, sweep_interval={}ms",
        config.load_keys, config.load_ttl_secs, config.load_workers, config.sweep_interval_ms
    );

    let stop = Arc::new(AtomicBool::new(false));
    let signal_handle = tokio::spawn(shutdown_signal(stop.clone()));

    let result = run_all(&config, &stop).await;
    signal_handle.abort();
    result
}

async fn run_all(config: &Config, stop: &Arc<AtomicBool>) -> anyhow::Result<()> {
    for &kind in &config.codecs {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        run_codec(config, kind, stop.clone()).await?;
    }

    if stop.load(Ordering::SeqCst) {
        warn!("Load run stopped early");
    } else {
        info!("Load run complete");
    }
    Ok(())
}

async fn run_codec(config: &Config, kind: CodecKind, stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    info!("Benchmarking {} codec", kind);

    let cache = ExpiringCache::from_parts(kind.build(), Box::new(SystemClock));
    let sweep_handle = spawn_sweep_task(cache.clone(), config.sweep_interval());

    let (keys, workers, ttl) = (config.load_keys, config.load_workers, config.load_ttl());
    let worker_cache = cache.clone();
    let reports = tokio::task::spawn_blocking(move || {
        let set = run_set_load(&worker_cache, keys, workers, ttl, &stop);
        let get = run_get_load(&worker_cache, keys, workers, &stop);
        [set, get]
    })
    .await;

    sweep_handle.abort();
    let reports = reports.context("load workers panicked")?;

    for report in &reports {
        log_report(report)?;
    }
    let stats = serde_json::to_string(&cache.stats())?;
    info!(%stats, "Cache stats");
    Ok(())
}

fn log_report(report: &LoadReport) -> anyhow::Result<()> {
    info!(
        "Time taken to {:?} {} of {} keys with {} codec: {:.2}ms",
        report.operation, report.completed, report.keys, report.codec, report.elapsed_ms
    );
    let json = serde_json::to_string(report)?;
    info!(report = %json, "Load report");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then raises `stop`.
///
/// Load workers check the flag between keys, so a running load ends
/// promptly instead of finishing every remaining key.
async fn shutdown_signal(stop: Arc<AtomicBool>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping load run...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping load run...");
        }
    }

    stop.store(true, Ordering::SeqCst);
}
