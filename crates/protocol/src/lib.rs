//! Pulse Protocol - Wire codec and transport packaging
//!
//! This crate provides the two wire layers every Pulse server speaks:
//! - `Unpacker` / `Token` - pull decoder for the type-tagged value format
//! - `Packer` - append-only encoder for the same format
//! - `Package` - transport frame carrying one request or reply body
//!
//! # Design Principles
//!
//! - **Zero-copy**: `Token::Raw` borrows from the input buffer; `Package`
//!   bodies use `bytes::Bytes` for reference-counted sharing
//! - **No allocations for scalars**: decoding an integer or double touches
//!   only the caller's stack
//! - **Streaming**: `Package::parse` consumes complete frames from a
//!   `BytesMut` and reports "not enough bytes yet" without copying

mod error;
mod pack;
mod package;
pub mod tag;
mod unpack;

pub use error::ProtocolError;
pub use pack::{strip_term, Packer};
pub use package::{Package, PackageType, HEADER_SIZE, MAX_BODY_SIZE};
pub use unpack::{Token, Unpacker};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Default encoder capacity in bytes
pub const DEFAULT_PACKER_CAPACITY: usize = 512;

#[cfg(test)]
mod package_test;
