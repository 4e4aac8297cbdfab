//! Per-thread utilization profiling.
//!
//! Each worker owns a [`ThreadStats`] slot and accumulates the time it spent
//! running jobs versus looking for them. Snapshots expose the split as
//! percentages for the utilization report.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Atomic accumulators updated by a single worker thread.
#[derive(Debug, Default)]
pub(crate) struct ThreadStats {
    /// Nanoseconds spent executing job bodies.
    active_ns: AtomicU64,
    /// Nanoseconds spent failing to find work before parking.
    idle_ns: AtomicU64,
    /// Job bodies run on this thread, inline dependants included.
    jobs_executed: AtomicU64,
    /// Jobs taken from another worker's queue.
    jobs_stolen: AtomicU64,
}

impl ThreadStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_active(&self, elapsed: Duration) {
        self.active_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_idle(&self, elapsed: Duration) {
        self.idle_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_executed(&self) {
        self.jobs_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_steal(&self) {
        self.jobs_stolen.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time view of this thread's accumulators.
    pub(crate) fn snapshot(&self, thread: usize) -> ThreadUtilization {
        ThreadUtilization {
            thread,
            active: Duration::from_nanos(self.active_ns.load(Ordering::Relaxed)),
            idle: Duration::from_nanos(self.idle_ns.load(Ordering::Relaxed)),
            jobs_executed: self.jobs_executed.load(Ordering::Relaxed),
            jobs_stolen: self.jobs_stolen.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of one worker thread's activity.
#[derive(Debug, Clone)]
pub struct ThreadUtilization {
    /// Worker index.
    pub thread: usize,
    /// Time spent executing job bodies.
    pub active: Duration,
    /// Time spent looking for work without finding any.
    pub idle: Duration,
    /// Job bodies run on this thread, inline dependants included.
    pub jobs_executed: u64,
    /// Jobs taken from another worker's queue.
    pub jobs_stolen: u64,
}

impl ThreadUtilization {
    /// Share of measured time spent executing, as a percentage.
    pub fn active_percent(&self) -> f64 {
        let total = self.active + self.idle;
        if total.is_zero() {
            0.0
        } else {
            self.active.as_secs_f64() / total.as_secs_f64() * 100.0
        }
    }

    /// Share of measured time spent idle, as a percentage.
    pub fn idle_percent(&self) -> f64 {
        if (self.active + self.idle).is_zero() {
            0.0
        } else {
            100.0 - self.active_percent()
        }
    }
}

impl fmt::Display for ThreadUtilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Thread {}: Active: {:.1}%, Idle: {:.1}%",
            self.thread,
            self.active_percent(),
            self.idle_percent()
        )
    }
}
