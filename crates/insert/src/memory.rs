//! In-memory collaborators
//!
//! `MemoryRegistry` and `MemoryStorage` implement the storage-side seams
//! entirely in memory. They back the test suites and small embedded
//! deployments; a real cluster plugs its storage engine in instead.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::traits::{PointStorage, SeriesHandle, SeriesRegistry, Value, ValueKind};

#[derive(Debug, Default)]
struct RegistryInner {
    by_name: HashMap<Vec<u8>, SeriesHandle>,
    next_id: u64,
}

/// In-memory series dictionary
///
/// Get-or-create is serialized behind one mutex, so two racing creations
/// of the same name always resolve to the same handle.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    inner: Mutex<RegistryInner>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered series
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().by_name.len()
    }

    /// True when no series exist
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a series without creating it
    pub fn get(&self, name: &[u8]) -> Option<SeriesHandle> {
        self.inner.lock().unwrap().by_name.get(name).copied()
    }
}

#[async_trait]
impl SeriesRegistry for MemoryRegistry {
    async fn get_or_create(
        &self,
        name: &[u8],
        kind: ValueKind,
    ) -> Result<SeriesHandle, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = inner.by_name.get(name) {
            return Ok(*handle);
        }
        let handle = SeriesHandle::new(inner.next_id, kind);
        inner.next_id += 1;
        inner.by_name.insert(name.to_vec(), handle);
        tracing::debug!(series = handle.id(), kind = %kind, "created series");
        Ok(handle)
    }
}

/// In-memory point sink
///
/// Appends are kept per series in arrival order, which the tests use to
/// assert end-to-end ordering.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    points: Mutex<HashMap<u64, Vec<(i64, Value)>>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// All points appended to a series, in append order
    pub fn points_for(&self, series: SeriesHandle) -> Vec<(i64, Value)> {
        self.points
            .lock()
            .unwrap()
            .get(&series.id())
            .cloned()
            .unwrap_or_default()
    }

    /// Total appended points across all series
    pub fn total_points(&self) -> usize {
        self.points.lock().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PointStorage for MemoryStorage {
    async fn append(
        &self,
        series: SeriesHandle,
        timestamp: i64,
        value: Value,
    ) -> Result<(), StorageError> {
        if value.kind() != series.kind() {
            return Err(StorageError::kind_mismatch(series.kind(), value.kind()));
        }
        self.points
            .lock()
            .unwrap()
            .entry(series.id())
            .or_default()
            .push((timestamp, value));
        Ok(())
    }
}
