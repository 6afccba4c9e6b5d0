//! Queue Metrics Module
//!
//! Operation counters for [`BlockingQueue`](crate::BlockingQueue). Counters are plain
//! relaxed atomics updated next to (never instead of) the queue's locked state, so a
//! snapshot taken under concurrent traffic is approximate.
//!
//! Every insert and remove call is classified once:
//!
//! | Outcome | Counts as |
//! |---------|-----------|
//! | value inserted or removed | success, with its elapsed time |
//! | blocking insert dropped by shutdown | failure (`discarded`) |
//! | `try_insert` handed its value back | failure (`rejected`) |
//! | remove returned the empty sentinel | failure (`empty_removes`) |
//!
//! A call that had to wait on a condition at least once is additionally contended.

use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Snapshot of a queue's operation counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PerformanceMetrics {
    /// Total number of insert and remove calls observed
    pub total_operations: u64,
    /// Calls that moved a value in or out
    pub successful_operations: u64,
    /// Calls that did not move a value
    pub failed_operations: u64,
    /// Calls that had to wait on a condition at least once
    pub contended_operations: u64,
    /// Cumulative time spent in successful calls, in nanoseconds
    pub total_operation_time_ns: u64,
    /// Average time of a successful call, in nanoseconds
    pub avg_operation_time_ns: u64,
    /// Longest successful call, in nanoseconds
    pub max_operation_time_ns: u64,
    /// Current size of the backing store in bytes
    pub memory_usage_bytes: usize,
    /// Largest backing store size seen, in bytes
    pub peak_memory_usage_bytes: usize,
    /// Values placed in the queue
    pub inserted: u64,
    /// Values taken out of the queue
    pub removed: u64,
    /// Blocking inserts whose value was dropped because of shutdown
    pub discarded: u64,
    /// `try_insert` calls that handed their value back
    pub rejected: u64,
    /// Removes that returned the empty sentinel
    pub empty_removes: u64,
}

impl PerformanceMetrics {
    /// Percentage of calls that moved a value
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_operations, self.total_operations)
    }

    /// Percentage of calls that did not move a value
    pub fn failure_rate(&self) -> f64 {
        percentage(self.failed_operations, self.total_operations)
    }

    /// Percentage of calls that had to block
    pub fn contention_rate(&self) -> f64 {
        percentage(self.contended_operations, self.total_operations)
    }

    /// Percentage of insert attempts whose value was lost to shutdown
    pub fn discard_rate(&self) -> f64 {
        percentage(self.discarded, self.inserted + self.discarded + self.rejected)
    }

    /// Average time of a successful call
    pub fn avg_operation_time(&self) -> Duration {
        Duration::from_nanos(self.avg_operation_time_ns)
    }

    /// Longest successful call
    pub fn max_operation_time(&self) -> Duration {
        Duration::from_nanos(self.max_operation_time_ns)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Atomic counters owned by each queue
#[derive(Debug)]
pub(crate) struct AtomicMetrics {
    enabled: AtomicBool,
    successful_operations: AtomicU64,
    failed_operations: AtomicU64,
    contended_operations: AtomicU64,
    total_time_ns: AtomicU64,
    max_time_ns: AtomicU64,
    memory_usage: AtomicUsize,
    peak_memory_usage: AtomicUsize,
    inserted: AtomicU64,
    removed: AtomicU64,
    discarded: AtomicU64,
    rejected: AtomicU64,
    empty_removes: AtomicU64,
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            successful_operations: AtomicU64::new(0),
            failed_operations: AtomicU64::new(0),
            contended_operations: AtomicU64::new(0),
            total_time_ns: AtomicU64::new(0),
            max_time_ns: AtomicU64::new(0),
            memory_usage: AtomicUsize::new(0),
            peak_memory_usage: AtomicUsize::new(0),
            inserted: AtomicU64::new(0),
            removed: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            empty_removes: AtomicU64::new(0),
        }
    }
}

impl AtomicMetrics {
    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Record `count` successful operations that together took `duration`
    fn record_success(&self, count: u64, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.successful_operations.fetch_add(count, Ordering::Relaxed);
        self.total_time_ns.fetch_add(duration_ns, Ordering::Relaxed);
        self.max_time_ns.fetch_max(duration_ns, Ordering::Relaxed);
    }

    fn record_failure(&self, counter: &AtomicU64) {
        if self.is_enabled() {
            self.failed_operations.fetch_add(1, Ordering::Relaxed);
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_insert(&self, duration: Duration) {
        if self.is_enabled() {
            self.record_success(1, duration);
            self.inserted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_remove(&self, duration: Duration) {
        self.record_removes(1, duration);
    }

    pub(crate) fn record_removes(&self, count: u64, duration: Duration) {
        if self.is_enabled() && count > 0 {
            self.record_success(count, duration);
            self.removed.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_discard(&self) {
        self.record_failure(&self.discarded);
    }

    pub(crate) fn record_rejection(&self) {
        self.record_failure(&self.rejected);
    }

    pub(crate) fn record_empty_remove(&self) {
        self.record_failure(&self.empty_removes);
    }

    /// Record a call that had to wait before it could proceed
    pub(crate) fn record_contention(&self) {
        if self.is_enabled() {
            self.contended_operations.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn update_memory_usage(&self, bytes: usize) {
        self.memory_usage.store(bytes, Ordering::Relaxed);
        self.peak_memory_usage.fetch_max(bytes, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PerformanceMetrics {
        let successful = self.successful_operations.load(Ordering::Relaxed);
        let failed = self.failed_operations.load(Ordering::Relaxed);
        let total_time = self.total_time_ns.load(Ordering::Relaxed);

        PerformanceMetrics {
            total_operations: successful + failed,
            successful_operations: successful,
            failed_operations: failed,
            contended_operations: self.contended_operations.load(Ordering::Relaxed),
            total_operation_time_ns: total_time,
            avg_operation_time_ns: if successful > 0 { total_time / successful } else { 0 },
            max_operation_time_ns: self.max_time_ns.load(Ordering::Relaxed),
            memory_usage_bytes: self.memory_usage.load(Ordering::Relaxed),
            peak_memory_usage_bytes: self.peak_memory_usage.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            empty_removes: self.empty_removes.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.successful_operations.store(0, Ordering::Relaxed);
        self.failed_operations.store(0, Ordering::Relaxed);
        self.contended_operations.store(0, Ordering::Relaxed);
        self.total_time_ns.store(0, Ordering::Relaxed);
        self.max_time_ns.store(0, Ordering::Relaxed);
        self.inserted.store(0, Ordering::Relaxed);
        self.removed.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.empty_removes.store(0, Ordering::Relaxed);
        // memory usage reflects the allocation, not traffic
    }
}

/// Trait for queues that expose operation counters
pub trait MetricsCollector {
    /// Get a snapshot of the current counters
    fn metrics(&self) -> PerformanceMetrics;

    /// Reset all traffic counters
    fn reset_metrics(&self);

    /// Enable or disable counter collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if counter collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}
