//! Pulse Insert - the insert pipeline core
//!
//! This crate takes a client-submitted insert payload from raw bytes to a
//! single reply package:
//!
//! ```text
//! client bytes -> Unpacker -> classify() -> per-pool sub-batches
//!              -> Dispatcher (local registry writes | remote forwards)
//!              -> reply package -> client
//! ```
//!
//! # Design
//!
//! - `classify` walks the payload once, validating every point and
//!   re-packing it into the owning pool's encoder
//! - `Dispatcher` fans the sub-batches out: the local pool's batch goes
//!   through the [`SeriesRegistry`]/[`PointStorage`] collaborators, remote
//!   batches through the [`Transport`]; one deadline covers the whole job
//! - failures are per pool; there is no cross-pool rollback
//! - exactly one reply per job, success or aggregated error

mod classify;
mod config;
mod dispatch;
mod error;
mod job;
mod local;
mod memory;
mod metrics;
pub mod reply;
mod traits;
mod transport;

pub use classify::{classify, PoolBatch, SubBatches};
pub use config::{ConfigError, InsertConfig};
pub use dispatch::Dispatcher;
pub use error::{FailureReason, InsertError, PoolFailure, StorageError, TransportError};
pub use job::{InsertJob, JobState};
pub use memory::{MemoryRegistry, MemoryStorage};
pub use metrics::{InsertMetrics, InsertMetricsSnapshot};
pub use traits::{PointStorage, SeriesHandle, SeriesRegistry, Transport, Value, ValueKind};
pub use transport::{ChannelTransport, PeerLink};

/// Result type for classification
pub type Result<T> = std::result::Result<T, InsertError>;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod transport_test;
