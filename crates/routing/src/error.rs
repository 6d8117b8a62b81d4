//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while building routing state
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A cluster must have at least one pool
    #[error("invalid pool count: {count} (a cluster needs at least one pool)")]
    InvalidPoolCount {
        /// The rejected pool count
        count: u16,
    },
}

impl RoutingError {
    /// Create an InvalidPoolCount error
    #[inline]
    pub fn invalid_pool_count(count: u16) -> Self {
        Self::InvalidPoolCount { count }
    }
}
