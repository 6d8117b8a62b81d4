//! Insert job: one in-flight insert request
//!
//! A job is created when classification succeeds and destroyed right after
//! its single reply is sent. The dispatcher is the only mutator.

use crate::classify::{PoolBatch, SubBatches};
use crate::error::PoolFailure;

/// Lifecycle of an insert job
///
/// `Classified -> Fanout -> Replied -> Released`, strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Sub-batches built, nothing dispatched yet
    Classified,
    /// Local write queued and remote sends issued
    Fanout,
    /// The one reply package has been produced
    Replied,
    /// Buffers handed back; terminal
    Released,
}

impl JobState {
    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classified => "classified",
            Self::Fanout => "fanout",
            Self::Replied => "replied",
            Self::Released => "released",
        }
    }
}

/// One in-flight insert request
#[derive(Debug)]
pub struct InsertJob {
    pid: u16,
    total_points: usize,
    batches: Vec<PoolBatch>,
    failures: Vec<PoolFailure>,
    state: JobState,
}

impl InsertJob {
    /// Create a job from a successful classification
    pub fn new(pid: u16, sub_batches: SubBatches) -> Self {
        let (total_points, batches) = sub_batches.into_pool_batches();
        Self {
            pid,
            total_points,
            batches,
            failures: Vec::new(),
            state: JobState::Classified,
        }
    }

    /// Correlation id of the originating client request
    #[inline]
    pub fn pid(&self) -> u16 {
        self.pid
    }

    /// Total points across all sub-batches
    #[inline]
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Sub-batches still held by the job
    #[inline]
    pub fn batches(&self) -> &[PoolBatch] {
        &self.batches
    }

    /// Pools that must report an outcome before the job can reply
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.batches.len()
    }

    /// Current lifecycle state
    #[inline]
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Failures recorded so far
    #[inline]
    pub fn failures(&self) -> &[PoolFailure] {
        &self.failures
    }

    /// Record a per-pool failure; the job keeps going
    pub fn record_failure(&mut self, failure: PoolFailure) {
        tracing::warn!(
            pid = self.pid,
            pool = %failure.pool,
            reason = %failure.reason,
            "pool failed during insert"
        );
        self.failures.push(failure);
    }

    /// Take ownership of the sub-batches for fan-out
    pub(crate) fn take_batches(&mut self) -> Vec<PoolBatch> {
        std::mem::take(&mut self.batches)
    }

    /// Advance the lifecycle, logging the transition
    pub(crate) fn advance(&mut self, next: JobState) {
        debug_assert!(next as u8 >= self.state as u8);
        tracing::debug!(
            pid = self.pid,
            from = self.state.as_str(),
            to = next.as_str(),
            "insert job state"
        );
        self.state = next;
    }
}
