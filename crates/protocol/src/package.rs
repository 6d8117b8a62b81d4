//! Transport package framing
//!
//! Every request and reply travels in a `Package`:
//!
//! ```text
//! [2 bytes: pid][4 bytes: body length][1 byte: type][1 byte: type ^ 0xFF]
//! [N bytes: wire-encoded body]
//! ```
//!
//! The header is little-endian. `pid` correlates a reply with its request;
//! the inverted type byte catches stream desynchronization before a bogus
//! length can be trusted.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{ProtocolError, Result};

/// Package header size in bytes
pub const HEADER_SIZE: usize = 8;

/// Maximum package body size (64 MiB)
pub const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Package type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PackageType {
    /// Client insert request; body is the payload map
    ReqInsert = 1,
    /// Insert accepted; body is `{"success_msg": <raw>}`
    ResInsertSuccess = 2,
    /// Insert rejected or partially failed; body is `{"error_msg": <raw>}`
    ResInsertError = 3,
    /// Peer acknowledgement of a forwarded sub-batch; empty body
    ResAck = 4,
}

impl PackageType {
    /// Parse from the wire byte
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ReqInsert),
            2 => Some(Self::ResInsertSuccess),
            3 => Some(Self::ResInsertError),
            4 => Some(Self::ResAck),
            _ => None,
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReqInsert => "req_insert",
            Self::ResInsertSuccess => "res_insert_success",
            Self::ResInsertError => "res_insert_error",
            Self::ResAck => "res_ack",
        }
    }

    /// The check byte paired with this type on the wire
    #[inline]
    pub const fn check_byte(self) -> u8 {
        self as u8 ^ 0xFF
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transport frame: header plus body
#[derive(Debug, Clone)]
pub struct Package {
    pid: u16,
    tp: PackageType,
    body: Bytes,
}

impl Package {
    /// Create a package from parts
    pub fn new(pid: u16, tp: PackageType, body: impl Into<Bytes>) -> Self {
        Self {
            pid,
            tp,
            body: body.into(),
        }
    }

    /// Correlation id
    #[inline]
    pub fn pid(&self) -> u16 {
        self.pid
    }

    /// Overwrite the correlation id
    ///
    /// The transport assigns a fresh pid per send; the original request pid
    /// lives in the insert job, not on the forwarded package.
    #[inline]
    pub fn set_pid(&mut self, pid: u16) {
        self.pid = pid;
    }

    /// Package type
    #[inline]
    pub fn tp(&self) -> PackageType {
        self.tp
    }

    /// Body bytes
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Total frame size on the wire
    #[inline]
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }

    /// Append the full frame to `buf`
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.reserve(self.frame_len());
        buf.put_u16_le(self.pid);
        buf.put_u32_le(self.body.len() as u32);
        buf.put_u8(self.tp as u8);
        buf.put_u8(self.tp.check_byte());
        buf.extend_from_slice(&self.body);
    }

    /// Serialize the full frame
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.frame_len());
        self.write_to(&mut buf);
        buf.freeze()
    }

    /// Consume one complete package from the front of `buf`
    ///
    /// Returns `Ok(None)` while the frame is still incomplete; the caller
    /// should read more bytes and try again. Header validation happens as
    /// soon as the header is available, so a corrupt stream fails before
    /// its claimed body length is waited for.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<Package>> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }

        let pid = u16::from_le_bytes([buf[0], buf[1]]);
        let len = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
        let tp = buf[6];
        let check = buf[7];

        if tp ^ 0xFF != check {
            return Err(ProtocolError::check_mismatch(tp, check));
        }
        if len > MAX_BODY_SIZE {
            return Err(ProtocolError::body_too_large(len));
        }
        let tp = PackageType::from_u8(tp).ok_or(ProtocolError::UnknownPackageType(tp))?;

        if buf.len() < HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(HEADER_SIZE);
        let body = buf.split_to(len).freeze();

        Ok(Some(Package { pid, tp, body }))
    }
}
