//! Run metrics and structured logging setup.
//!
//! `Metrics` is shared by reference across agents (including rayon workers),
//! so every field is atomic or behind a mutex.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Counters collected while agents run.
pub struct Metrics {
    tick_count: AtomicU64,
    collision_count: AtomicU64,
    unavailable_count: AtomicU64,
    feeding_count: AtomicU64,
    pub counters: Mutex<BTreeMap<String, u64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            collision_count: AtomicU64::new(0),
            unavailable_count: AtomicU64::new(0),
            feeding_count: AtomicU64::new(0),
            counters: Mutex::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records one agent tick.
    pub fn record_tick(&self, duration: Duration, unavailable: usize, feeding: bool) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.unavailable_count
            .fetch_add(unavailable as u64, Ordering::Relaxed);
        if feeding {
            self.feeding_count.fetch_add(1, Ordering::Relaxed);
        }

        // Log at info level every 10000 ticks
        if tick.is_multiple_of(10_000) {
            tracing::info!(
                tick = tick,
                collisions = self.collision_count(),
                duration_us = duration.as_micros() as u64,
                "Controller tick"
            );
        }
    }

    pub fn record_collision(&self) {
        self.collision_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn collision_count(&self) -> u64 {
        self.collision_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn unavailable_count(&self) -> u64 {
        self.unavailable_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn feeding_count(&self) -> u64 {
        self.feeding_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
