//! Pulse Routing - Series-to-pool assignment
//!
//! A Pulse cluster divides series ownership across pools. This crate holds
//! the routing primitives the insert path depends on:
//! - `PoolId` - a pool's cluster index as a typed handle
//! - `PoolMap` - the pure function from series name to owning pool
//!
//! Routing is deterministic and allocation-free: every lookup is one hash
//! over the name bytes. The hash is cluster state - see [`PoolMap`].

mod error;
mod map;
mod pool_id;

pub use error::{Result, RoutingError};
pub use map::PoolMap;
pub use pool_id::PoolId;

// Test modules - only compiled during testing
#[cfg(test)]
mod map_test;
