//! Value types for cubrid-backend
//!
//! The value model shared by the driver boundary and the framework boundary:
//! - Scalar types as the CUBRID driver reports them (integers, decimals, text)
//! - Date/time types, naive and offset-bearing
//! - Binary data, UUIDs
//! - Framework field kinds that select conversion rules

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// SQL value type that can hold any value crossing the adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit signed integer (INTEGER, SHORT)
    Int32(i32),
    /// 64-bit signed integer (BIGINT)
    Int64(i64),
    /// 64-bit floating point (DOUBLE PRECISION)
    Float64(f64),
    /// Arbitrary precision decimal (NUMERIC)
    Decimal(Decimal),
    /// Text string (VARCHAR, STRING, CHAR)
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date without time (DATE)
    Date(NaiveDate),
    /// Time without date or offset (TIME)
    Time(NaiveTime),
    /// Time of day carrying an offset. CUBRID cannot store these.
    TimeTz(NaiveTime, FixedOffset),
    /// Timestamp without timezone (DATETIME)
    DateTime(NaiveDateTime),
    /// Timestamp with an attached offset
    DateTimeTz(DateTime<FixedOffset>),
    /// UUID
    Uuid(Uuid),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int32(n) => Some(*n != 0),
            Self::Int64(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            Self::Decimal(d) if d.fract().is_zero() => d.to_string().parse().ok(),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to convert to bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            Self::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to convert to UUID
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            Self::String(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int32(n) => write!(f, "{}", n),
            Self::Int64(n) => write!(f, "{}", n),
            Self::Float64(n) => write!(f, "{}", n),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::String(s) => write!(f, "{}", s),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{}", d),
            Self::Time(t) => write!(f, "{}", t),
            Self::TimeTz(t, off) => write!(f, "{}{}", t, off),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::DateTimeTz(dt) => write!(f, "{}", dt),
            Self::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}

/// Database row as ordered column values
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Get column count
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if row is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get column names
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get all values
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get value by column index
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Get value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
    }

    /// Consume the row, keeping only its values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Framework model field kinds.
///
/// The names match the framework's internal type names so they can be parsed
/// straight from `get_internal_type()` style strings. Kinds this backend has no
/// rule for are kept verbatim in [`FieldKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FieldKind {
    AutoField,
    BigAutoField,
    BigIntegerField,
    BinaryField,
    BooleanField,
    CharField,
    CommaSeparatedIntegerField,
    DateField,
    DateTimeField,
    DecimalField,
    DurationField,
    FileField,
    FilePathField,
    FloatField,
    GenericIPAddressField,
    IPAddressField,
    IntegerField,
    NullBooleanField,
    OneToOneField,
    PositiveIntegerField,
    PositiveSmallIntegerField,
    SlugField,
    SmallIntegerField,
    TextField,
    TimeField,
    UUIDField,
    Other(String),
}

impl FieldKind {
    /// Framework internal type name
    pub fn internal_type(&self) -> &str {
        match self {
            Self::AutoField => "AutoField",
            Self::BigAutoField => "BigAutoField",
            Self::BigIntegerField => "BigIntegerField",
            Self::BinaryField => "BinaryField",
            Self::BooleanField => "BooleanField",
            Self::CharField => "CharField",
            Self::CommaSeparatedIntegerField => "CommaSeparatedIntegerField",
            Self::DateField => "DateField",
            Self::DateTimeField => "DateTimeField",
            Self::DecimalField => "DecimalField",
            Self::DurationField => "DurationField",
            Self::FileField => "FileField",
            Self::FilePathField => "FilePathField",
            Self::FloatField => "FloatField",
            Self::GenericIPAddressField => "GenericIPAddressField",
            Self::IPAddressField => "IPAddressField",
            Self::IntegerField => "IntegerField",
            Self::NullBooleanField => "NullBooleanField",
            Self::OneToOneField => "OneToOneField",
            Self::PositiveIntegerField => "PositiveIntegerField",
            Self::PositiveSmallIntegerField => "PositiveSmallIntegerField",
            Self::SlugField => "SlugField",
            Self::SmallIntegerField => "SmallIntegerField",
            Self::TextField => "TextField",
            Self::TimeField => "TimeField",
            Self::UUIDField => "UUIDField",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "AutoField" => Self::AutoField,
            "BigAutoField" => Self::BigAutoField,
            "BigIntegerField" => Self::BigIntegerField,
            "BinaryField" => Self::BinaryField,
            "BooleanField" => Self::BooleanField,
            "CharField" => Self::CharField,
            "CommaSeparatedIntegerField" => Self::CommaSeparatedIntegerField,
            "DateField" => Self::DateField,
            "DateTimeField" => Self::DateTimeField,
            "DecimalField" => Self::DecimalField,
            "DurationField" => Self::DurationField,
            "FileField" => Self::FileField,
            "FilePathField" => Self::FilePathField,
            "FloatField" => Self::FloatField,
            "GenericIPAddressField" => Self::GenericIPAddressField,
            "IPAddressField" => Self::IPAddressField,
            "IntegerField" => Self::IntegerField,
            "NullBooleanField" => Self::NullBooleanField,
            "OneToOneField" => Self::OneToOneField,
            "PositiveIntegerField" => Self::PositiveIntegerField,
            "PositiveSmallIntegerField" => Self::PositiveSmallIntegerField,
            "SlugField" => Self::SlugField,
            "SmallIntegerField" => Self::SmallIntegerField,
            "TextField" => Self::TextField,
            "TimeField" => Self::TimeField,
            "UUIDField" => Self::UUIDField,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_type())
    }
}

/// Column metadata reported by schema introspection
#[derive(Debug, Clone)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// SQL type name as CUBRID reports it
    pub type_name: String,
    /// Whether column is nullable
    pub nullable: bool,
    /// Primary key ordinal (1-based, None if not PK)
    pub primary_key_ordinal: Option<u32>,
    /// Maximum length for string/binary types
    pub max_length: Option<u32>,
    /// Precision for numeric types
    pub precision: Option<u32>,
    /// Scale for numeric types
    pub scale: Option<u32>,
    /// AUTO_INCREMENT column
    pub auto_increment: bool,
}

impl ColumnMetadata {
    /// Create basic column metadata
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            primary_key_ordinal: None,
            max_length: None,
            precision: None,
            scale: None,
            auto_increment: false,
        }
    }

    /// Check if this column is part of the primary key
    #[inline]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key_ordinal.is_some()
    }
}

/// Table metadata reported by schema introspection
#[derive(Debug, Clone)]
pub struct TableMetadata {
    /// Table name
    pub name: String,
    /// Column metadata (in ordinal order)
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create new table metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get primary key columns
    pub fn primary_key_columns(&self) -> Vec<&ColumnMetadata> {
        let mut pk_cols: Vec<_> = self.columns.iter().filter(|c| c.is_primary_key()).collect();
        pk_cols.sort_by_key(|c| c.primary_key_ordinal);
        pk_cols
    }
}
