//! Database wrapper
//!
//! [`DatabaseWrapper`] is the object the framework talks to. It owns the
//! settings, the capability table, the dialect and the codec for one
//! configured database, and drives a [`Driver`] for everything that needs
//! the server.
//!
//! The wrapper connects lazily: nothing is opened until the first cursor,
//! version lookup or statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use cubrid_backend::prelude::*;
//!
//! let config = BackendConfig::new("demodb").with_host("db.internal").with_port("33000");
//! let mut db = DatabaseWrapper::new(config, Box::new(driver))?;
//!
//! let rows = db.execute("SELECT name FROM athlete WHERE code = %s", &[Value::Int32(10999)]).await?;
//! let version = db.server_version().await?;
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::codec::{Direction, ValueCodec};
use crate::config::BackendConfig;
use crate::connection::{ConnectParams, Driver, DriverConnection, VENDOR};
use crate::cursor::{Cursor, CursorWrapper};
use crate::dialect::{CubridOperations, DialectOp};
use crate::error::{translate, Error, ErrorKind, Result};
use crate::features::{Capability, DatabaseFeatures};
use crate::types::{FieldKind, Row, TableMetadata, Value};

/// Schema introspection, supplied by the caller
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Names of the user tables
    async fn table_names(&self, cursor: &mut dyn Cursor) -> Result<Vec<String>>;

    /// Column layout of one table
    async fn table_description(&self, cursor: &mut dyn Cursor, table: &str)
        -> Result<TableMetadata>;
}

/// CUBRID backend for one configured database
pub struct DatabaseWrapper {
    config: BackendConfig,
    features: DatabaseFeatures,
    ops: CubridOperations,
    codec: ValueCodec,
    driver: Box<dyn Driver>,
    connection: Option<Box<dyn DriverConnection>>,
    server_version: Option<String>,
    introspector: Option<Box<dyn SchemaIntrospector>>,
}

impl DatabaseWrapper {
    /// Create a wrapper. The settings are validated; no connection is opened.
    pub fn new(config: BackendConfig, driver: Box<dyn Driver>) -> Result<Self> {
        config.check()?;
        let codec = ValueCodec::from_config(&config)?;
        let ops = CubridOperations::new(config.framework_version, config.use_tz);

        Ok(Self {
            config,
            features: DatabaseFeatures::cubrid(),
            ops,
            codec,
            driver,
            connection: None,
            server_version: None,
            introspector: None,
        })
    }

    /// Attach a schema introspector
    pub fn with_introspector(mut self, introspector: Box<dyn SchemaIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Vendor name
    pub fn vendor(&self) -> &'static str {
        VENDOR
    }

    /// Backend settings
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Capability table
    pub fn features(&self) -> &DatabaseFeatures {
        &self.features
    }

    /// Dialect formatter
    pub fn ops(&self) -> &CubridOperations {
        &self.ops
    }

    /// Value codec
    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    /// Arguments passed to [`Driver::connect`]
    pub fn connection_params(&self) -> ConnectParams {
        ConnectParams::from_config(&self.config)
    }

    /// Whether a driver connection is open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open a fresh driver connection, without storing it
    pub async fn get_new_connection(&self) -> Result<Box<dyn DriverConnection>> {
        let params = self.connection_params();
        let conn = self
            .driver
            .connect(
                &params.url,
                &params.user,
                params.password.expose_secret(),
                &params.charset,
            )
            .await
            .map_err(|e| {
                Error::connection_with_source(format!("cannot connect to {}", params.url), e)
            })?;

        debug!(url = %params.url, user = %params.user, "opened CUBRID connection");
        Ok(conn)
    }

    async fn ensure_connection(&mut self) -> Result<&dyn DriverConnection> {
        if self.connection.is_none() {
            let conn = self.get_new_connection().await?;
            self.connection = Some(conn);
        }
        self.connection
            .as_deref()
            .ok_or_else(|| Error::connection("connection not established"))
    }

    /// Open a cursor, connecting first if needed
    pub async fn create_cursor(&mut self) -> Result<CursorWrapper> {
        let conn = self.ensure_connection().await?;
        let inner = conn.cursor().map_err(translate)?;
        Ok(CursorWrapper::new(inner))
    }

    /// Run a template and collect its rows.
    ///
    /// The cursor is closed even when the statement fails; the statement's
    /// error wins over a close error.
    pub async fn execute(&mut self, template: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut cursor = self.create_cursor().await?;
        let result: Result<Vec<Row>> = async {
            cursor.execute(template, params).await?;
            cursor.fetch_all().await
        }
        .await;
        finish(cursor, result).await
    }

    /// Run a template once per parameter row, returns affected row count
    pub async fn execute_many(&mut self, template: &str, param_rows: &[Vec<Value>]) -> Result<u64> {
        let mut cursor = self.create_cursor().await?;
        let result = cursor.execute_many(template, param_rows).await;
        finish(cursor, result).await
    }

    /// Ping the server. Driver errors mean "not usable" and are not raised.
    pub async fn is_usable(&self) -> bool {
        let Some(conn) = self.connection.as_deref() else {
            return false;
        };
        match conn.ping().await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(error = %e, "CUBRID connection ping failed");
                false
            }
        }
    }

    /// Server version string, cached after the first lookup
    pub async fn server_version(&mut self) -> Result<String> {
        if let Some(version) = &self.server_version {
            return Ok(version.clone());
        }

        let conn = self.ensure_connection().await?;
        let version = conn.server_version().await.map_err(translate)?;
        if version.is_empty() {
            return Err(Error::Driver {
                kind: ErrorKind::Database,
                args: vec![Value::from("Unable to determine CUBRID version")],
            });
        }

        self.server_version = Some(version.clone());
        Ok(version)
    }

    /// Switch autocommit on the open connection
    pub async fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        let conn = self.ensure_connection().await?;
        conn.set_autocommit(autocommit).await.map_err(translate)
    }

    /// Release a savepoint. CUBRID has no `RELEASE SAVEPOINT`, so this does nothing.
    pub async fn savepoint_commit(&mut self, _sid: &str) -> Result<()> {
        Ok(())
    }

    /// Close the connection if one is open
    pub async fn close(&mut self) -> Result<()> {
        self.server_version = None;
        match self.connection.take() {
            Some(conn) => conn.close().await.map_err(translate),
            None => Ok(()),
        }
    }

    /// Look up a capability flag
    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.features.capability(name)
    }

    /// Render a dialect fragment
    pub fn fragment(&self, op: &DialectOp) -> Result<String> {
        self.ops.fragment(op)
    }

    /// Render a dialect fragment, one part per statement or bound
    pub fn fragment_parts(&self, op: &DialectOp) -> Result<Vec<String>> {
        self.ops.fragment_parts(op)
    }

    /// Convert a value for a field
    pub fn convert_value(
        &self,
        direction: Direction,
        kind: &FieldKind,
        value: Value,
    ) -> Result<Value> {
        self.codec.convert(direction, kind, value)
    }

    /// Id generated by the last insert on this connection
    pub async fn last_insert_id(&mut self, table: &str, pk_name: &str) -> Result<Value> {
        let mut cursor = self.create_cursor().await?;
        let result = self.ops.last_insert_id(&mut cursor, table, pk_name).await;
        finish(cursor, result).await
    }

    /// Names of the user tables
    pub async fn introspect_tables(&mut self) -> Result<Vec<String>> {
        let introspector = self
            .introspector
            .take()
            .ok_or_else(|| Error::not_applicable("introspect_tables"))?;
        let result: Result<Vec<String>> = async {
            let mut cursor = self.create_cursor().await?;
            let result = introspector.table_names(&mut cursor).await;
            finish(cursor, result).await
        }
        .await;
        self.introspector = Some(introspector);
        result
    }

    /// Column layout of one table
    pub async fn introspect_table(&mut self, table: &str) -> Result<TableMetadata> {
        let introspector = self
            .introspector
            .take()
            .ok_or_else(|| Error::not_applicable("introspect_table"))?;
        let result: Result<TableMetadata> = async {
            let mut cursor = self.create_cursor().await?;
            let result = introspector.table_description(&mut cursor, table).await;
            finish(cursor, result).await
        }
        .await;
        self.introspector = Some(introspector);
        result
    }
}

/// Close `cursor`, then hand back `result`, or the close error if `result` is `Ok`
async fn finish<T>(mut cursor: CursorWrapper, result: Result<T>) -> Result<T> {
    let closed = cursor.close().await;
    let value = result?;
    closed?;
    Ok(value)
}

impl std::fmt::Debug for DatabaseWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseWrapper")
            .field("config", &self.config)
            .field("connected", &self.connection.is_some())
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}
