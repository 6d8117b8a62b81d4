//! Insert pipeline metrics
//!
//! Lock-free counters updated on the hot path; `snapshot()` gives a
//! consistent-enough view for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the insert pipeline
#[derive(Debug, Default)]
pub struct InsertMetrics {
    /// Insert requests that reached classification
    requests_received: AtomicU64,

    /// Requests rejected by the classifier
    requests_rejected: AtomicU64,

    /// Points accepted by classification
    points_received: AtomicU64,

    /// Points appended to local storage
    points_appended: AtomicU64,

    /// Sub-batches forwarded to remote pools
    batches_forwarded: AtomicU64,

    /// Per-pool failures of any kind
    pool_failures: AtomicU64,

    /// Pools that hit the job deadline
    timeouts: AtomicU64,

    /// Replies produced (at most one per request)
    replies_sent: AtomicU64,
}

impl InsertMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            points_received: AtomicU64::new(0),
            points_appended: AtomicU64::new(0),
            batches_forwarded: AtomicU64::new(0),
            pool_failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            replies_sent: AtomicU64::new(0),
        }
    }

    /// Record an accepted request and its point count
    #[inline]
    pub fn record_request(&self, points: usize) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
        self.points_received
            .fetch_add(points as u64, Ordering::Relaxed);
    }

    /// Record a classification rejection
    #[inline]
    pub fn record_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record locally appended points
    #[inline]
    pub fn record_appended(&self, points: usize) {
        self.points_appended
            .fetch_add(points as u64, Ordering::Relaxed);
    }

    /// Record a sub-batch forwarded to a peer
    #[inline]
    pub fn record_forwarded(&self) {
        self.batches_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-pool failure
    #[inline]
    pub fn record_pool_failure(&self) {
        self.pool_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pool hitting the job deadline
    #[inline]
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the reply leaving the dispatcher
    #[inline]
    pub fn record_reply(&self) {
        self.replies_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> InsertMetricsSnapshot {
        InsertMetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            points_received: self.points_received.load(Ordering::Relaxed),
            points_appended: self.points_appended.load(Ordering::Relaxed),
            batches_forwarded: self.batches_forwarded.load(Ordering::Relaxed),
            pool_failures: self.pool_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            replies_sent: self.replies_sent.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`InsertMetrics`]
#[derive(Debug, Clone, Copy)]
pub struct InsertMetricsSnapshot {
    pub requests_received: u64,
    pub requests_rejected: u64,
    pub points_received: u64,
    pub points_appended: u64,
    pub batches_forwarded: u64,
    pub pool_failures: u64,
    pub timeouts: u64,
    pub replies_sent: u64,
}
