//! Value codec
//!
//! Converts values between the CUBRID driver representation and the
//! framework's typed values.
//!
//! # Inbound (driver -> framework)
//!
//! | Field kind                          | Rule                                   |
//! |-------------------------------------|----------------------------------------|
//! | `BinaryField`                       | `0B0100...` bit string to bytes        |
//! | `TextField`                         | canonical UTF-8 text                   |
//! | `BooleanField`, `NullBooleanField`  | `0`/`1` to `false`/`true`              |
//! | `DateTimeField` (only with `use_tz`)| attach the connection timezone         |
//! | `UUIDField`                         | canonical text to [`Uuid`]             |
//!
//! Every rule maps NULL to NULL. Kinds without a rule pass through unchanged.
//!
//! # Outbound (framework -> driver)
//!
//! CUBRID does not store offsets. Aware datetimes are normalized to UTC when
//! `use_tz` is on and rejected otherwise; aware times are always rejected.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::types::{FieldKind, Value};

/// Prefix CUBRID puts in front of bit string literals
pub const BINARY_PREFIX: &str = "0B";

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Driver result to framework value
    Inbound,
    /// Framework value to driver parameter
    Outbound,
}

/// Inbound conversion rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundRule {
    /// Bit string literal to bytes
    Binary,
    /// Canonical text
    Text,
    /// Integer to boolean
    Boolean,
    /// Attach connection timezone
    DateTime,
    /// Text to UUID
    Uuid,
}

/// Converts values for one connection configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueCodec {
    use_tz: bool,
    timezone: Tz,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new(false, Tz::UTC)
    }
}

impl ValueCodec {
    /// Create a codec
    pub const fn new(use_tz: bool, timezone: Tz) -> Self {
        Self { use_tz, timezone }
    }

    /// Create a codec from backend settings
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Ok(Self::new(config.use_tz, config.timezone()?))
    }

    /// Whether aware datetimes are in use
    pub fn use_tz(&self) -> bool {
        self.use_tz
    }

    /// Connection timezone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Inbound rule registered for a field kind
    pub fn converter_for(&self, kind: &FieldKind) -> Option<InboundRule> {
        match kind {
            FieldKind::BinaryField => Some(InboundRule::Binary),
            FieldKind::TextField => Some(InboundRule::Text),
            FieldKind::BooleanField | FieldKind::NullBooleanField => Some(InboundRule::Boolean),
            FieldKind::DateTimeField if self.use_tz => Some(InboundRule::DateTime),
            FieldKind::UUIDField => Some(InboundRule::Uuid),
            _ => None,
        }
    }

    /// Convert `value` for a field of `kind`
    pub fn convert(&self, direction: Direction, kind: &FieldKind, value: Value) -> Result<Value> {
        match direction {
            Direction::Inbound => self.inbound(kind, value),
            Direction::Outbound => self.outbound(kind, value),
        }
    }

    /// Apply the inbound rule for `kind`
    pub fn inbound(&self, kind: &FieldKind, value: Value) -> Result<Value> {
        match self.converter_for(kind) {
            Some(rule) => self.apply(rule, value),
            None => Ok(value),
        }
    }

    /// Apply one inbound rule
    pub fn apply(&self, rule: InboundRule, value: Value) -> Result<Value> {
        match rule {
            InboundRule::Binary => convert_binary(value),
            InboundRule::Text => convert_text(value),
            InboundRule::Boolean => Ok(convert_boolean(value)),
            InboundRule::DateTime => self.convert_datetime(value),
            InboundRule::Uuid => convert_uuid(value),
        }
    }

    /// Attach the connection timezone to a naive timestamp
    pub fn convert_datetime(&self, value: Value) -> Result<Value> {
        match value {
            Value::DateTime(naive) => {
                let aware = self
                    .timezone
                    .from_local_datetime(&naive)
                    .single()
                    .ok_or_else(|| {
                        Error::data(format!(
                            "{} is ambiguous or does not exist in {}",
                            naive, self.timezone
                        ))
                    })?;
                Ok(Value::DateTimeTz(aware.fixed_offset()))
            }
            other => Ok(other),
        }
    }

    /// Render `value` as the driver literal for a field of `kind`
    pub fn outbound(&self, kind: &FieldKind, value: Value) -> Result<Value> {
        match kind {
            FieldKind::DateTimeField => self.adapt_datetime(value),
            FieldKind::TimeField => adapt_time(value),
            FieldKind::UUIDField => Ok(adapt_uuid(value)),
            _ => Ok(value),
        }
    }

    /// Render a datetime parameter.
    ///
    /// Aware values are converted to UTC and stripped of their offset when
    /// `use_tz` is on; otherwise they are a data error.
    pub fn adapt_datetime(&self, value: Value) -> Result<Value> {
        match value {
            Value::DateTimeTz(aware) => {
                if !self.use_tz {
                    return Err(Error::data(
                        "CUBRID does not support timezone-aware datetime when use_tz is off",
                    ));
                }
                Ok(Value::String(format_datetime(&to_utc_naive(&aware))))
            }
            Value::DateTime(naive) => Ok(Value::String(format_datetime(&naive))),
            other => Ok(other),
        }
    }
}

fn to_utc_naive<T: TimeZone>(value: &DateTime<T>) -> NaiveDateTime {
    value.with_timezone(&Utc).naive_utc()
}

/// Decode a `0B` bit string into bytes
pub fn decode_binary_literal(literal: &str) -> Result<Vec<u8>> {
    let bits = literal
        .strip_prefix(BINARY_PREFIX)
        .ok_or_else(|| Error::data(format!("Unexpected value: {}", literal)))?;

    if bits.len() % 8 != 0 {
        return Err(Error::data(format!(
            "bit string of length {} is not a whole number of bytes",
            bits.len()
        )));
    }

    bits.as_bytes()
        .chunks(8)
        .map(|chunk| {
            chunk.iter().try_fold(0u8, |acc, bit| match bit {
                b'0' => Ok(acc << 1),
                b'1' => Ok((acc << 1) | 1),
                _ => Err(Error::data(format!("invalid bit string: {}", literal))),
            })
        })
        .collect()
}

/// Encode bytes as a `0B` bit string
pub fn encode_binary_literal(bytes: &[u8]) -> String {
    let mut literal = String::with_capacity(BINARY_PREFIX.len() + bytes.len() * 8);
    literal.push_str(BINARY_PREFIX);
    for byte in bytes {
        literal.push_str(&format!("{:08b}", byte));
    }
    literal
}

fn convert_binary(value: Value) -> Result<Value> {
    match value {
        Value::String(literal) => Ok(Value::Bytes(decode_binary_literal(&literal)?)),
        Value::Null | Value::Bytes(_) => Ok(value),
        other => Err(Error::data(format!("Unexpected value: {}", other))),
    }
}

fn convert_text(value: Value) -> Result<Value> {
    match value {
        Value::Null | Value::String(_) => Ok(value),
        Value::Bytes(bytes) => String::from_utf8(bytes)
            .map(Value::String)
            .map_err(|e| Error::data(format!("text column is not valid UTF-8: {}", e))),
        other => Ok(Value::String(other.to_string())),
    }
}

/// `0` and `1` become booleans; everything else is returned as is
fn convert_boolean(value: Value) -> Value {
    match value {
        Value::Int32(0) | Value::Int64(0) => Value::Bool(false),
        Value::Int32(1) | Value::Int64(1) => Value::Bool(true),
        Value::Decimal(d) if d == Decimal::ZERO => Value::Bool(false),
        Value::Decimal(d) if d == Decimal::ONE => Value::Bool(true),
        other => other,
    }
}

fn convert_uuid(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => Uuid::parse_str(&s)
            .map(Value::Uuid)
            .map_err(|e| Error::data(format!("invalid UUID '{}': {}", s, e))),
        other => Ok(other),
    }
}

/// Render a time parameter; offset-bearing times are a data error
pub fn adapt_time(value: Value) -> Result<Value> {
    match value {
        Value::TimeTz(..) => Err(Error::data(
            "CUBRID does not support timezone-aware times",
        )),
        Value::Time(t) => Ok(Value::String(format_time(&t))),
        other => Ok(other),
    }
}

/// Render a UUID parameter as 32 hex digits
pub fn adapt_uuid(value: Value) -> Value {
    match value {
        Value::Uuid(u) => Value::String(u.simple().to_string()),
        other => other,
    }
}

/// `YYYY-MM-DD HH:MM:SS`, with `.ffffff` only when there are microseconds
pub fn format_datetime(value: &NaiveDateTime) -> String {
    format!("{} {}", value.format("%Y-%m-%d"), format_time(&value.time()))
}

/// `HH:MM:SS`, with `.ffffff` only when there are microseconds.
/// A leap second renders as `:60` with the fraction of that second.
pub fn format_time(value: &NaiveTime) -> String {
    let micros = (value.nanosecond() / 1_000) % 1_000_000;
    if micros == 0 {
        value.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", value.format("%H:%M:%S"), micros)
    }
}
