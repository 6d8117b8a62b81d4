//! Tests for the pool map

use crate::{PoolMap, RoutingError};

#[test]
fn test_zero_pools_rejected() {
    assert!(matches!(
        PoolMap::new(0),
        Err(RoutingError::InvalidPoolCount { count: 0 })
    ));
}

#[test]
fn test_single_pool_takes_everything() {
    let pools = PoolMap::new(1).unwrap();
    for name in [&b"cpu.load"[..], b"mem", b"a", b"\xFF\xFE"] {
        assert_eq!(pools.pool_of(name).index(), 0);
    }
}

#[test]
fn test_deterministic() {
    let pools = PoolMap::new(7).unwrap();
    let first = pools.pool_of(b"series-42");
    for _ in 0..100 {
        assert_eq!(pools.pool_of(b"series-42"), first);
    }
}

#[test]
fn test_result_always_in_range() {
    let pools = PoolMap::new(3).unwrap();
    for i in 0..1000u32 {
        let name = format!("series.{i}");
        assert!(pools.pool_of(name.as_bytes()).index() < 3);
    }
}

#[test]
fn test_terminated_name_routes_like_plain_name() {
    let pools = PoolMap::new(5).unwrap();
    assert_eq!(pools.pool_of(b"cpu.load"), pools.pool_of(b"cpu.load\0"));
}

#[test]
fn test_known_placements() {
    // Pin a few assignments: these are cluster state and must never move.
    let pools = PoolMap::new(4).unwrap();
    let spread: Vec<u16> = (0..16)
        .map(|i| pools.pool_of(format!("host-{i}.cpu").as_bytes()).index())
        .collect();
    // All four pools get traffic from a small realistic name set.
    for pool in 0..4u16 {
        assert!(
            spread.contains(&pool),
            "pool {pool} received nothing from {spread:?}"
        );
    }
}

#[test]
fn test_pool_count_accessor() {
    assert_eq!(PoolMap::new(9).unwrap().pool_count(), 9);
}
