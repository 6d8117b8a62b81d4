//! Response packager
//!
//! Builds the one-entry reply maps in the wire format. The prose strings
//! are the only user-visible insert outcome text; client libraries match
//! on them, so their exact phrasing is part of the wire contract.

use pulse_protocol::{Package, PackageType, Packer};

use crate::error::{InsertError, PoolFailure};

/// Build `{"success_msg": <text>}` as `RES_INSERT_SUCCESS`
pub fn success(pid: u16, points: usize) -> Package {
    let text = format!("Inserted {points} point(s) successfully.");
    build(pid, PackageType::ResInsertSuccess, b"success_msg", &text)
}

/// Build `{"error_msg": <text>}` as `RES_INSERT_ERROR`
pub fn error(pid: u16, message: &str) -> Package {
    build(pid, PackageType::ResInsertError, b"error_msg", message)
}

/// Error reply for a failed classification
pub fn classify_error(pid: u16, err: InsertError) -> Package {
    error(pid, &err.to_string())
}

/// Error reply for a job where one or more pools failed
///
/// `successful_points` is the point count the remaining pools accepted;
/// those writes are not rolled back.
pub fn pool_failure(pid: u16, failures: &[PoolFailure], successful_points: usize) -> Package {
    let mut pools: Vec<u16> = failures.iter().map(|f| f.pool.index()).collect();
    pools.sort_unstable();
    pools.dedup();

    let list = pools
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    error(
        pid,
        &format!(
            "Failed to insert points in pool(s) {list}; {successful_points} \
             point(s) in the remaining pool(s) were inserted successfully."
        ),
    )
}

fn build(pid: u16, tp: PackageType, key: &[u8], text: &str) -> Package {
    let mut packer = Packer::with_capacity(64 + text.len());
    packer.open_map();
    packer.push_raw(key);
    packer.push_raw(text.as_bytes());
    packer.close_map();
    Package::new(pid, tp, packer.into_bytes())
}
