//! Observability: tracing setup and in-process counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, repeated CLI calls) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    downloads_served: AtomicU64,
    downloads_failed: AtomicU64,
    attempts_made: AtomicU64,
    clips_created: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_served(&self) {
        self.downloads_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_served", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn attempt_made(&self) {
        self.attempts_made.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "attempts_made", "Metric incremented");
    }

    pub fn clip_created(&self) {
        self.clips_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "clips_created", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            downloads_served: self.downloads_served.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            attempts_made: self.attempts_made.load(Ordering::Relaxed),
            clips_created: self.clips_created.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub downloads_served: u64,
    pub downloads_failed: u64,
    pub attempts_made: u64,
    pub clips_created: u64,
}
