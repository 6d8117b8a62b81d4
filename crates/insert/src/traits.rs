//! Collaborator interfaces for the insert path
//!
//! The dispatcher finishes local writes through [`SeriesRegistry`] and
//! [`PointStorage`] and forwards remote sub-batches through [`Transport`].
//! The concrete implementations live outside this crate (storage engine,
//! cluster networking); in-memory versions for tests and embedding ship as
//! [`crate::MemoryRegistry`], [`crate::MemoryStorage`] and
//! [`crate::PeerLink`].

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use pulse_protocol::Package;
use pulse_routing::PoolId;

use crate::error::{StorageError, TransportError};

/// The value type of a series, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed 64-bit integers
    Integer,
    /// IEEE-754 doubles
    Float,
    /// Byte strings
    Raw,
}

impl ValueKind {
    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Raw => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One point value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer
    Integer(i64),
    /// IEEE-754 double
    Float(f64),
    /// Byte string, owned so it can cross await points
    Raw(Bytes),
}

impl Value {
    /// The kind of this value
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Raw(_) => ValueKind::Raw,
        }
    }
}

/// Opaque handle to a registered series
///
/// Carries the series id assigned by the registry and the value kind the
/// series was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesHandle {
    id: u64,
    kind: ValueKind,
}

impl SeriesHandle {
    /// Create a handle; called by registry implementations
    #[inline]
    pub const fn new(id: u64, kind: ValueKind) -> Self {
        Self { id, kind }
    }

    /// Registry-assigned series id
    #[inline]
    pub const fn id(self) -> u64 {
        self.id
    }

    /// The series value kind
    #[inline]
    pub const fn kind(self) -> ValueKind {
        self.kind
    }
}

/// Series dictionary: get-or-create by name
///
/// Implementations must serialize concurrent creations of the same name;
/// two racing `get_or_create` calls for one name return the same handle.
#[async_trait]
pub trait SeriesRegistry: Send + Sync {
    /// Look up `name`, creating the series with `kind` when absent
    ///
    /// The kind is only consulted at creation; an existing series keeps
    /// the kind it was created with.
    async fn get_or_create(
        &self,
        name: &[u8],
        kind: ValueKind,
    ) -> std::result::Result<SeriesHandle, StorageError>;
}

/// Point sink for the local pool
#[async_trait]
pub trait PointStorage: Send + Sync {
    /// Append one point to a series
    async fn append(
        &self,
        series: SeriesHandle,
        timestamp: i64,
        value: Value,
    ) -> std::result::Result<(), StorageError>;
}

/// Cluster transport towards peer pools
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a package to a pool and await its reply
    ///
    /// The transport assigns a fresh correlation pid before the package
    /// hits the wire; the caller's pid is overwritten.
    async fn send(
        &self,
        pool: PoolId,
        pkg: Package,
    ) -> std::result::Result<Package, TransportError>;
}
