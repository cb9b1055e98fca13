//! Global atomic counters for assetlint runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event at the end of a command.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    steps_executed: AtomicU64,
    fixes_applied: AtomicU64,
    fix_failures: AtomicU64,
    remote_fetches: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            steps_executed: AtomicU64::new(0),
            fixes_applied: AtomicU64::new(0),
            fix_failures: AtomicU64::new(0),
            remote_fetches: AtomicU64::new(0),
        }
    }

    pub fn inc_steps_executed(&self) {
        self.steps_executed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "steps_executed", "counter incremented");
    }

    /// Add `n` repaired items.
    pub fn add_fixes_applied(&self, n: u64) {
        self.fixes_applied.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "fixes_applied", n, "counter incremented");
    }

    pub fn add_fix_failures(&self, n: u64) {
        self.fix_failures.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "fix_failures", n, "counter incremented");
    }

    /// Count one successful remote list fetch.
    pub fn inc_remote_fetches(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "remote_fetches", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            steps_executed = self.steps_executed(),
            fixes_applied = self.fixes_applied(),
            fix_failures = self.fix_failures(),
            remote_fetches = self.remote_fetches(),
        );
    }

    pub fn steps_executed(&self) -> u64 {
        self.steps_executed.load(Ordering::Relaxed)
    }

    pub fn fixes_applied(&self) -> u64 {
        self.fixes_applied.load(Ordering::Relaxed)
    }

    pub fn fix_failures(&self) -> u64 {
        self.fix_failures.load(Ordering::Relaxed)
    }

    pub fn remote_fetches(&self) -> u64 {
        self.remote_fetches.load(Ordering::Relaxed)
    }
}
