//! Pool identifier type

use std::fmt;

/// Identifies one pool in the cluster
///
/// The router hashes every series name down to a `PoolId`, and the insert
/// path uses that id for two decisions: which per-pool encoder slot a
/// series is re-packed into, and whether a finished sub-batch is applied
/// locally or forwarded to a peer. Pool ids are the dense indices
/// `0..pool_count` fixed by cluster configuration; they are not reused
/// and never change while the cluster lives.
///
/// Failure reporting leans on the same id: an insert reply names failing
/// pools by index, and log fields print the id through `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u16);

impl PoolId {
    /// Create a pool ID from its cluster index
    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// The cluster index of this pool
    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// The index widened for slot lookups (encoder slots, peer links)
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PoolId {
    /// Renders as `pool N`, the form used in log fields and error text
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool {}", self.0)
    }
}
