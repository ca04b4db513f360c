//! Error types for cubrid-backend
//!
//! Two directions meet here:
//! - Errors the adapter raises itself (bad values, malformed templates, config)
//! - Errors the CUBRID driver raises, which are translated 1:1 onto the
//!   framework's error classes by [`translate`]

use std::fmt;
use thiserror::Error;

use crate::types::Value;

/// Result type for cubrid-backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framework database error classes.
///
/// The driver follows the DB-API naming scheme, so a driver class maps onto a
/// framework class of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic base error, used for every unmapped driver class
    Error,
    /// Misuse of the driver interface (e.g. closed cursor)
    Interface,
    /// Generic driver-reported database failure
    Database,
    /// Value conversion failure
    Data,
    /// Connectivity and server-side operational failures
    Operational,
    /// Constraint violation
    Integrity,
    /// Internal driver error
    Internal,
    /// Malformed SQL
    Programming,
    /// Feature not supported by the database
    NotSupported,
}

impl ErrorKind {
    /// Map a native driver error class name onto a framework error class.
    ///
    /// Names with no counterpart fall back to [`ErrorKind::Error`].
    pub fn from_native_name(name: &str) -> Self {
        match name {
            "InterfaceError" => Self::Interface,
            "DatabaseError" => Self::Database,
            "DataError" => Self::Data,
            "OperationalError" => Self::Operational,
            "IntegrityError" => Self::Integrity,
            "InternalError" => Self::Internal,
            "ProgrammingError" => Self::Programming,
            "NotSupportedError" => Self::NotSupported,
            _ => Self::Error,
        }
    }

    /// Class name as the framework spells it
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Interface => "InterfaceError",
            Self::Database => "DatabaseError",
            Self::Data => "DataError",
            Self::Operational => "OperationalError",
            Self::Integrity => "IntegrityError",
            Self::Internal => "InternalError",
            Self::Programming => "ProgrammingError",
            Self::NotSupported => "NotSupportedError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// An exception raised by the CUBRID driver.
///
/// `kind` is the driver's class name, `args` its positional arguments
/// (typically an error code followed by a message).
#[derive(Debug, Clone, PartialEq)]
pub struct NativeError {
    /// Driver exception class name
    pub kind: String,
    /// Positional arguments
    pub args: Vec<Value>,
}

impl NativeError {
    /// Create a native error
    pub fn new(kind: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    /// Convenience for the common `(code, message)` shape
    pub fn with_code(kind: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self::new(kind, vec![Value::Int32(code), Value::String(message.into())])
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, join_args(&self.args))
    }
}

impl std::error::Error for NativeError {}

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Main error type for cubrid-backend
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// A driver error translated onto a framework error class
    #[error("{kind}: {}", join_args(.args))]
    Driver { kind: ErrorKind, args: Vec<Value> },

    /// Cannot reach the server
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<NativeError>,
    },

    /// Operating on a closed cursor or connection
    #[error("interface error: {message}")]
    Interface { message: String },

    /// Value conversion failure
    #[error("data error: {message}")]
    Data { message: String },

    /// Malformed SQL template
    #[error("programming error: {message}")]
    Programming { message: String, sql: Option<String> },

    /// Backend improperly configured
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Operation does not exist for the configured framework version
    #[error("not applicable: {operation}")]
    NotApplicable { operation: String },
}

impl Error {
    /// Framework error class for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Driver { kind, .. } => *kind,
            Self::Connection { .. } => ErrorKind::Operational,
            Self::Interface { .. } => ErrorKind::Interface,
            Self::Data { .. } => ErrorKind::Data,
            Self::Programming { .. } => ErrorKind::Programming,
            Self::Configuration { .. } => ErrorKind::Error,
            Self::NotApplicable { .. } => ErrorKind::NotSupported,
        }
    }

    /// Positional arguments of a translated driver error
    pub fn args(&self) -> &[Value] {
        match self {
            Self::Driver { args, .. } => args,
            _ => &[],
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error caused by a driver error
    pub fn connection_with_source(message: impl Into<String>, source: NativeError) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an interface error
    pub fn interface(message: impl Into<String>) -> Self {
        Self::Interface {
            message: message.into(),
        }
    }

    /// Create a data error
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a programming error
    pub fn programming(message: impl Into<String>) -> Self {
        Self::Programming {
            message: message.into(),
            sql: None,
        }
    }

    /// Create a programming error with SQL
    pub fn programming_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Programming {
            message: message.into(),
            sql: Some(sql.into()),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-applicable error
    pub fn not_applicable(operation: impl Into<String>) -> Self {
        Self::NotApplicable {
            operation: operation.into(),
        }
    }
}

/// Translate a driver error into its framework equivalent.
///
/// The positional arguments are carried over untouched.
pub fn translate(native: NativeError) -> Error {
    Error::Driver {
        kind: ErrorKind::from_native_name(&native.kind),
        args: native.args,
    }
}

impl From<NativeError> for Error {
    fn from(native: NativeError) -> Self {
        translate(native)
    }
}
