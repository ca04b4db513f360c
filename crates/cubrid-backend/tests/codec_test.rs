//! Integration tests for the value codec

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use cubrid_backend::codec::{decode_binary_literal, encode_binary_literal, Direction, ValueCodec};
use cubrid_backend::config::BackendConfig;
use cubrid_backend::error::{Error, ErrorKind};
use cubrid_backend::types::{FieldKind, Value};
use proptest::prelude::*;
use uuid::Uuid;

fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn test_binary_inbound() {
    let codec = ValueCodec::default();
    let value = codec
        .convert(
            Direction::Inbound,
            &FieldKind::BinaryField,
            Value::from("0B0100100001101001"),
        )
        .unwrap();
    assert_eq!(value, Value::Bytes(b"Hi".to_vec()));

    let err = codec
        .convert(Direction::Inbound, &FieldKind::BinaryField, Value::from("X'4869'"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    let err = codec
        .convert(Direction::Inbound, &FieldKind::BinaryField, Value::from("0B101"))
        .unwrap_err();
    assert!(matches!(err, Error::Data { .. }));
}

#[test]
fn test_boolean_inbound() {
    let codec = ValueCodec::default();
    let convert = |v| {
        codec
            .convert(Direction::Inbound, &FieldKind::BooleanField, v)
            .unwrap()
    };

    assert_eq!(convert(Value::Int32(0)), Value::Bool(false));
    assert_eq!(convert(Value::Int32(1)), Value::Bool(true));
    assert_eq!(convert(Value::Int32(5)), Value::Int32(5));
    assert_eq!(convert(Value::Null), Value::Null);
}

#[test]
fn test_boolean_round_trip() {
    for b in [false, true] {
        let stored = Value::Int32(i32::from(b));
        let back = ValueCodec::default()
            .convert(Direction::Inbound, &FieldKind::NullBooleanField, stored)
            .unwrap();
        assert_eq!(back, Value::Bool(b));
    }
}

#[test]
fn test_datetime_inbound_attaches_timezone() {
    let codec = ValueCodec::new(true, chrono_tz::Asia::Seoul);
    let value = codec
        .convert(
            Direction::Inbound,
            &FieldKind::DateTimeField,
            Value::DateTime(naive(2024, 3, 15, 9, 30, 0)),
        )
        .unwrap();

    let expected = FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
        .unwrap();
    assert_eq!(value, Value::DateTimeTz(expected));
}

#[test]
fn test_datetime_inbound_without_use_tz_is_identity() {
    let codec = ValueCodec::new(false, chrono_tz::Asia::Seoul);
    let raw = Value::DateTime(naive(2024, 3, 15, 9, 30, 0));
    assert_eq!(
        codec
            .convert(Direction::Inbound, &FieldKind::DateTimeField, raw.clone())
            .unwrap(),
        raw
    );
}

#[test]
fn test_datetime_inbound_nonexistent_local_time() {
    let codec = ValueCodec::new(true, chrono_tz::Europe::Berlin);
    let err = codec
        .convert(
            Direction::Inbound,
            &FieldKind::DateTimeField,
            Value::DateTime(naive(2024, 3, 31, 2, 30, 0)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_uuid_inbound() {
    let codec = ValueCodec::default();
    let value = codec
        .convert(
            Direction::Inbound,
            &FieldKind::UUIDField,
            Value::from("67e5504410b1426f9247bb680e5fe0c8"),
        )
        .unwrap();
    assert_eq!(
        value.as_uuid(),
        Some(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap())
    );

    assert!(codec
        .convert(Direction::Inbound, &FieldKind::UUIDField, Value::from("nope"))
        .is_err());
}

#[test]
fn test_text_inbound() {
    let codec = ValueCodec::default();
    assert_eq!(
        codec
            .convert(
                Direction::Inbound,
                &FieldKind::TextField,
                Value::Bytes("본문".as_bytes().to_vec())
            )
            .unwrap(),
        Value::from("본문")
    );
}

#[test]
fn test_unregistered_kind_passes_through() {
    let codec = ValueCodec::default();
    let raw = Value::from("0B1111");
    assert_eq!(
        codec
            .convert(Direction::Inbound, &FieldKind::CharField, raw.clone())
            .unwrap(),
        raw
    );
}

#[test]
fn test_aware_datetime_outbound_without_use_tz_fails() {
    let codec = ValueCodec::new(false, Tz::UTC);
    let aware = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
        .unwrap();

    let err = codec
        .convert(Direction::Outbound, &FieldKind::DateTimeField, Value::DateTimeTz(aware))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_aware_datetime_outbound_normalizes_to_utc() {
    let codec = ValueCodec::new(true, Tz::UTC);
    let aware = FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
        .unwrap();

    let value = codec
        .convert(Direction::Outbound, &FieldKind::DateTimeField, Value::DateTimeTz(aware))
        .unwrap();
    assert_eq!(value, Value::from("2024-03-15 00:30:00"));
    let literal = value.as_str().unwrap();
    assert!(!literal.contains('+'));
}

#[test]
fn test_naive_datetime_outbound() {
    let codec = ValueCodec::default();
    let value = codec
        .convert(
            Direction::Outbound,
            &FieldKind::DateTimeField,
            Value::DateTime(naive(1999, 12, 31, 23, 59, 59)),
        )
        .unwrap();
    assert_eq!(value, Value::from("1999-12-31 23:59:59"));
}

#[test]
fn test_time_outbound() {
    let codec = ValueCodec::new(true, Tz::UTC);
    let t = chrono::NaiveTime::from_hms_micro_opt(7, 8, 9, 10).unwrap();

    assert_eq!(
        codec
            .convert(Direction::Outbound, &FieldKind::TimeField, Value::Time(t))
            .unwrap(),
        Value::from("07:08:09.000010")
    );
    let err = codec
        .convert(
            Direction::Outbound,
            &FieldKind::TimeField,
            Value::TimeTz(t, FixedOffset::east_opt(0).unwrap()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_codec_from_config() {
    let config = BackendConfig::new("demodb")
        .with_use_tz(true)
        .with_time_zone("America/New_York");
    let codec = ValueCodec::from_config(&config).unwrap();
    assert!(codec.use_tz());
    assert_eq!(codec.timezone(), chrono_tz::America::New_York);

    let config = BackendConfig::new("demodb").with_time_zone("Nowhere/Special");
    assert!(ValueCodec::from_config(&config).is_err());
}

#[test]
fn test_binary_round_trip_edges() {
    for bytes in [Vec::new(), vec![0xFF; 32], vec![0x00; 3]] {
        assert_eq!(
            decode_binary_literal(&encode_binary_literal(&bytes)).unwrap(),
            bytes
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_binary_literal_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let literal = encode_binary_literal(&bytes);
        prop_assert!(literal.starts_with("0B"));
        prop_assert_eq!(literal.len(), 2 + bytes.len() * 8);
        prop_assert_eq!(decode_binary_literal(&literal).unwrap(), bytes);
    }

    #[test]
    fn prop_ragged_bit_strings_rejected(bits in "[01]{1,63}") {
        prop_assume!(bits.len() % 8 != 0);
        let literal = format!("0B{}", bits);
        prop_assert!(decode_binary_literal(&literal).is_err());
    }
}
