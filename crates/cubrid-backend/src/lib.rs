//! # cubrid-backend
//!
//! CUBRID database backend for ORM frameworks.
//!
//! This crate sits between an ORM's query compiler and a CUBRID client
//! library. It speaks the framework's backend contract on one side and a small
//! driver trait on the other.
//!
//! ## Features
//!
//! - **Placeholder Rewriting**: `%s` templates become `?` driver statements
//! - **Error Translation**: Driver exceptions map onto framework error classes
//! - **SQL Dialect**: Date truncation, interval arithmetic, quoting, bulk inserts
//! - **Value Codec**: Bit strings, booleans, aware datetimes, UUIDs
//! - **Capability Table**: What CUBRID supports, queryable by name
//! - **Version Gating**: Operations follow the targeted framework release
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cubrid_backend::prelude::*;
//!
//! let config = BackendConfig::from_file("cubrid.yaml")?;
//! let mut db = DatabaseWrapper::new(config, Box::new(MyCubridDriver::default()))?;
//!
//! // Templates use the framework's %s markers
//! let rows = db
//!     .execute("SELECT name FROM athlete WHERE nation_code = %s", &[Value::from("KOR")])
//!     .await?;
//!
//! // Dialect fragments
//! let sql = db.fragment(&DialectOp::DateTrunc {
//!     lookup: "month".into(),
//!     expr: "`game`.`game_date`".into(),
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod backend;
pub mod codec;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod dialect;
pub mod error;
pub mod features;
pub mod placeholder;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{translate, Error, ErrorKind, NativeError, Result};

    // Value and type system
    pub use crate::types::{ColumnMetadata, FieldKind, Row, TableMetadata, Value};

    // Settings
    pub use crate::config::{BackendConfig, FrameworkVersion, SensitiveString};

    // Driver boundary
    pub use crate::connection::{
        ConnectParams, Driver, DriverConnection, DriverCursor, DriverResult, VENDOR,
    };

    // Framework boundary
    pub use crate::backend::{DatabaseWrapper, SchemaIntrospector};
    pub use crate::cursor::{Cursor, CursorWrapper};

    // Dialect, codec and capabilities
    pub use crate::codec::{Direction, ValueCodec};
    pub use crate::dialect::{
        ColumnParams, Connector, CubridOperations, DialectOp, Interval, SequenceReset, TruncUnit,
    };
    pub use crate::features::{Capability, DatabaseFeatures};
    pub use crate::placeholder::rewrite;
}

// Re-export commonly used items at crate root
pub use backend::DatabaseWrapper;
pub use config::BackendConfig;
pub use error::{Error, Result};
pub use types::Value;
