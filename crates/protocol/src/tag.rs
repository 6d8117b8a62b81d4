//! Wire tag bytes
//!
//! One tag byte precedes every value on the wire. These constants are part
//! of the wire contract; changing any of them breaks every deployed client.

/// Signed 64-bit integer, big-endian payload
pub const INT64: u8 = 0xE0;

/// IEEE-754 binary64, big-endian byte order
pub const DOUBLE: u8 = 0xE1;

/// Length-prefixed byte string (ULEB128 length, then the bytes)
pub const RAW: u8 = 0xE2;

/// Fixed-arity array of one element
pub const ARRAY1: u8 = 0xF1;

/// Fixed-arity array of five elements
pub const ARRAY5: u8 = 0xF5;

/// Variable-length array start
pub const ARRAY_OPEN: u8 = 0xF6;

/// Variable-length array end
pub const ARRAY_CLOSE: u8 = 0xF7;

/// Variable-length map start
pub const MAP_OPEN: u8 = 0xF8;

/// Variable-length map end
pub const MAP_CLOSE: u8 = 0xF9;

/// Tag byte for a fixed-arity array header
///
/// # Panics
///
/// Panics if `arity` is outside `1..=5`.
#[inline]
pub const fn array(arity: u8) -> u8 {
    assert!(arity >= 1 && arity <= 5, "fixed array arity must be 1..=5");
    ARRAY1 + arity - 1
}
