//! Insert error types
//!
//! Three tiers: classification errors fail the whole request before any
//! I/O; per-pool failures are collected by the dispatcher while other
//! pools continue; collaborator errors feed into the per-pool tier.

use pulse_protocol::{PackageType, ProtocolError};
use pulse_routing::PoolId;
use thiserror::Error;

use crate::traits::ValueKind;

/// Classification errors
///
/// The display strings are the wire contract: they travel verbatim in the
/// `error_msg` reply and client libraries match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    /// A series name was not followed by an array
    #[error("Expecting an array with points.")]
    ExpectingArrayOfPoints,

    /// Malformed map entry (missing name, stray token, empty name)
    #[error(
        "Expecting a series name (string value) with an array of points \
         where each point should be an integer time-stamp with a value."
    )]
    ExpectingSeriesNameAndPoints,

    /// Top-level payload is neither a map nor an array
    #[error("Expecting an array or map containing series and points.")]
    ExpectingMapOrArray,

    /// Point timestamp is not an integer
    #[error("Expecting an integer value as time-stamp.")]
    ExpectingIntegerTs,

    /// Point timestamp falls outside the configured window
    #[error("Received at least one time-stamp which is out-of-range.")]
    TimestampOutOfRange,

    /// Point value is not an integer, string or float
    #[error(
        "Unsupported value received. \
         (only integer, string and float values are supported)."
    )]
    UnsupportedValue,

    /// A series was submitted with an empty points array
    #[error("Expecting a series to have at least one point.")]
    ExpectingAtLeastOnePoint,
}

/// Errors from the series registry and point storage collaborators
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Appended value does not match the series value type
    #[error("value kind {actual} does not match series kind {expected}")]
    KindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Series handle is not known to the storage backend
    #[error("unknown series handle {0}")]
    UnknownSeries(u64),

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Create a kind mismatch error
    #[inline]
    pub fn kind_mismatch(expected: ValueKind, actual: ValueKind) -> Self {
        Self::KindMismatch { expected, actual }
    }

    /// Create a backend error
    #[inline]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Errors from the pool transport collaborator
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No peer registered for the pool
    #[error("no route to {0}")]
    NoRoute(PoolId),

    /// Peer send queue rejected the package
    #[error("send queue full for {0}")]
    QueueFull(PoolId),

    /// Peer connection is gone
    #[error("connection to {0} closed")]
    Closed(PoolId),
}

/// Why one pool of an insert job failed
#[derive(Debug, Clone, Error)]
pub enum FailureReason {
    /// The package never left this server
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The peer replied with an insert error
    #[error("peer error: {0}")]
    Peer(String),

    /// The peer replied with a package type that makes no sense here
    #[error("unexpected reply type {0}")]
    UnexpectedReply(PackageType),

    /// The local registry or storage refused the write
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Our own sub-batch failed to decode; this is a bug, not bad input
    #[error("sub-batch decode failed: {0}")]
    Corrupt(#[from] ProtocolError),

    /// No outcome before the job deadline
    #[error("timed out")]
    Timeout,
}

/// One failed pool within an otherwise continuing insert job
#[derive(Debug, Clone)]
pub struct PoolFailure {
    /// The pool that failed
    pub pool: PoolId,
    /// What went wrong
    pub reason: FailureReason,
}

impl PoolFailure {
    /// Create a pool failure record
    #[inline]
    pub fn new(pool: PoolId, reason: impl Into<FailureReason>) -> Self {
        Self {
            pool,
            reason: reason.into(),
        }
    }
}
