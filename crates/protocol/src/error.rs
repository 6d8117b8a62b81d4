//! Protocol error types
//!
//! Errors that can occur while decoding the value format or parsing a
//! transport package.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, Error)]
pub enum ProtocolError {
    /// Input ended inside a scalar or a RAW payload
    #[error("input truncated at offset {offset}: {missing} more byte(s) required")]
    Truncated { offset: usize, missing: usize },

    /// Tag byte is not part of the wire contract
    #[error("unknown tag byte 0x{tag:02X} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Close token with no matching open
    #[error("container underflow: {0}")]
    ContainerUnderflow(&'static str),

    /// Structurally invalid input
    #[error("malformed input: {0}")]
    Malformed(&'static str),

    /// Package header check byte does not match the type byte
    #[error("package check byte mismatch: type 0x{tp:02X}, check 0x{check:02X}")]
    CheckMismatch { tp: u8, check: u8 },

    /// Package type byte is not part of the wire contract
    #[error("unknown package type {0}")]
    UnknownPackageType(u8),

    /// Package body exceeds the maximum size
    #[error("package body length {len} exceeds maximum {max}")]
    BodyTooLarge { len: usize, max: usize },
}

impl ProtocolError {
    /// Create a truncated input error
    #[inline]
    pub fn truncated(offset: usize, missing: usize) -> Self {
        Self::Truncated { offset, missing }
    }

    /// Create an unknown tag error
    #[inline]
    pub fn unknown_tag(tag: u8, offset: usize) -> Self {
        Self::UnknownTag { tag, offset }
    }

    /// Create a container underflow error
    #[inline]
    pub fn underflow(msg: &'static str) -> Self {
        Self::ContainerUnderflow(msg)
    }

    /// Create a malformed input error
    #[inline]
    pub fn malformed(msg: &'static str) -> Self {
        Self::Malformed(msg)
    }

    /// Create a check byte mismatch error
    #[inline]
    pub fn check_mismatch(tp: u8, check: u8) -> Self {
        Self::CheckMismatch { tp, check }
    }

    /// Create a body too large error
    #[inline]
    pub fn body_too_large(len: usize) -> Self {
        Self::BodyTooLarge {
            len,
            max: crate::MAX_BODY_SIZE,
        }
    }
}
