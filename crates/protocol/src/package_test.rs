//! Tests for transport package framing

use bytes::BytesMut;

use crate::package::{Package, PackageType, HEADER_SIZE};
use crate::ProtocolError;

#[test]
fn test_package_type_from_u8() {
    assert_eq!(PackageType::from_u8(1), Some(PackageType::ReqInsert));
    assert_eq!(PackageType::from_u8(2), Some(PackageType::ResInsertSuccess));
    assert_eq!(PackageType::from_u8(3), Some(PackageType::ResInsertError));
    assert_eq!(PackageType::from_u8(4), Some(PackageType::ResAck));
    assert_eq!(PackageType::from_u8(200), None);
}

#[test]
fn test_check_byte() {
    assert_eq!(PackageType::ReqInsert.check_byte(), 0xFE);
    assert_eq!(PackageType::ResAck.check_byte(), 0xFB);
}

#[test]
fn test_header_layout() {
    let pkg = Package::new(0x0102, PackageType::ReqInsert, &b"abc"[..]);
    let bytes = pkg.to_bytes();

    assert_eq!(bytes.len(), HEADER_SIZE + 3);
    assert_eq!(&bytes[0..2], &[0x02, 0x01]); // pid, little-endian
    assert_eq!(&bytes[2..6], &[3, 0, 0, 0]); // body length
    assert_eq!(bytes[6], 1); // type
    assert_eq!(bytes[7], 0xFE); // check
    assert_eq!(&bytes[8..], b"abc");
}

#[test]
fn test_roundtrip() {
    let pkg = Package::new(77, PackageType::ResInsertSuccess, &b"payload"[..]);

    let mut buf = BytesMut::new();
    pkg.write_to(&mut buf);

    let parsed = Package::parse(&mut buf).unwrap().unwrap();
    assert_eq!(parsed.pid(), 77);
    assert_eq!(parsed.tp(), PackageType::ResInsertSuccess);
    assert_eq!(parsed.body(), b"payload");
    assert!(buf.is_empty());
}

#[test]
fn test_parse_incomplete_header() {
    let mut buf = BytesMut::from(&[0x01, 0x00, 0x05][..]);
    assert!(Package::parse(&mut buf).unwrap().is_none());
    assert_eq!(buf.len(), 3); // nothing consumed
}

#[test]
fn test_parse_incomplete_body() {
    let pkg = Package::new(1, PackageType::ReqInsert, &b"0123456789"[..]);
    let full = pkg.to_bytes();

    let mut buf = BytesMut::from(&full[..full.len() - 1]);
    assert!(Package::parse(&mut buf).unwrap().is_none());

    buf.extend_from_slice(&full[full.len() - 1..]);
    let parsed = Package::parse(&mut buf).unwrap().unwrap();
    assert_eq!(parsed.body(), b"0123456789");
}

#[test]
fn test_parse_two_frames() {
    let first = Package::new(1, PackageType::ReqInsert, &b"one"[..]);
    let second = Package::new(2, PackageType::ResAck, &b""[..]);

    let mut buf = BytesMut::new();
    first.write_to(&mut buf);
    second.write_to(&mut buf);

    let a = Package::parse(&mut buf).unwrap().unwrap();
    let b = Package::parse(&mut buf).unwrap().unwrap();
    assert_eq!(a.pid(), 1);
    assert_eq!(b.pid(), 2);
    assert_eq!(b.tp(), PackageType::ResAck);
    assert!(Package::parse(&mut buf).unwrap().is_none());
}

#[test]
fn test_check_mismatch_rejected() {
    let pkg = Package::new(9, PackageType::ReqInsert, &b"x"[..]);
    let bytes = pkg.to_bytes();

    let mut corrupted = BytesMut::from(&bytes[..]);
    corrupted[7] ^= 0x01;

    assert!(matches!(
        Package::parse(&mut corrupted),
        Err(ProtocolError::CheckMismatch { .. })
    ));
}

#[test]
fn test_unknown_type_rejected() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0, 0]); // pid
    buf.extend_from_slice(&[0, 0, 0, 0]); // length
    buf.extend_from_slice(&[99, 99 ^ 0xFF]); // valid check, unknown type

    assert!(matches!(
        Package::parse(&mut buf),
        Err(ProtocolError::UnknownPackageType(99))
    ));
}

#[test]
fn test_oversized_body_rejected_from_header() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0, 0]); // pid
    buf.extend_from_slice(&u32::MAX.to_le_bytes()); // absurd length
    buf.extend_from_slice(&[1, 0xFE]);

    // Rejected without waiting for the claimed body
    assert!(matches!(
        Package::parse(&mut buf),
        Err(ProtocolError::BodyTooLarge { .. })
    ));
}

#[test]
fn test_set_pid() {
    let mut pkg = Package::new(0, PackageType::ReqInsert, &b""[..]);
    pkg.set_pid(41);
    assert_eq!(pkg.pid(), 41);
}
