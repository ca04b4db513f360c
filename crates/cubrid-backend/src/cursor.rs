//! Cursor interface exposed to the framework
//!
//! [`Cursor`] lists exactly what the framework may do with a cursor.
//! [`CursorWrapper`] implements it over a driver cursor:
//! - Templates are rewritten from `%s` to `?` before execution
//! - Marker count is checked against the bound parameters
//! - Driver errors go through [`translate`]
//! - Use after [`Cursor::close`] is an interface error

use async_trait::async_trait;
use tracing::debug;

use crate::connection::DriverCursor;
use crate::error::{translate, Error, Result};
use crate::placeholder::{rewrite_counted, RewrittenQuery};
use crate::types::{Row, Value};

/// Cursor operations available to the framework
#[async_trait]
pub trait Cursor: Send {
    /// Execute a template with `%s` markers, returns affected row count
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute a template once per parameter row
    async fn execute_many(&mut self, sql: &str, param_rows: &[Vec<Value>]) -> Result<u64>;

    /// Next row of the current result set
    async fn fetch_one(&mut self) -> Result<Option<Row>>;

    /// Remaining rows of the current result set
    async fn fetch_all(&mut self) -> Result<Vec<Row>>;

    /// Close the cursor. Closing twice is allowed.
    async fn close(&mut self) -> Result<()>;

    /// Whether the cursor has been closed
    fn is_closed(&self) -> bool;
}

/// Framework cursor over a driver cursor
pub struct CursorWrapper {
    inner: Box<dyn DriverCursor>,
    closed: bool,
}

impl CursorWrapper {
    /// Wrap a driver cursor
    pub fn new(inner: Box<dyn DriverCursor>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::interface("cursor already closed"));
        }
        Ok(())
    }

    fn prepare(sql: &str, params: usize) -> Result<RewrittenQuery> {
        let query = rewrite_counted(sql);
        if query.markers != params {
            return Err(Error::programming_with_sql(
                format!(
                    "statement has {} markers but {} parameters were supplied",
                    query.markers, params
                ),
                sql,
            ));
        }
        Ok(query)
    }
}

impl std::fmt::Debug for CursorWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorWrapper")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cursor for CursorWrapper {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.ensure_open()?;
        let query = Self::prepare(sql, params.len())?;
        debug!(sql = %query.sql, "cursor execute");

        self.inner
            .execute(&query.sql, params)
            .await
            .map_err(translate)
    }

    async fn execute_many(&mut self, sql: &str, param_rows: &[Vec<Value>]) -> Result<u64> {
        self.ensure_open()?;
        let query = rewrite_counted(sql);
        if let Some(row) = param_rows.iter().find(|r| r.len() != query.markers) {
            return Err(Error::programming_with_sql(
                format!(
                    "statement has {} markers but a parameter row has {} values",
                    query.markers,
                    row.len()
                ),
                sql,
            ));
        }
        debug!(sql = %query.sql, rows = param_rows.len(), "cursor execute_many");

        self.inner
            .execute_many(&query.sql, param_rows)
            .await
            .map_err(translate)
    }

    async fn fetch_one(&mut self) -> Result<Option<Row>> {
        self.ensure_open()?;
        self.inner.fetch_one().await.map_err(translate)
    }

    async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        self.ensure_open()?;
        self.inner.fetch_all().await.map_err(translate)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close().await.map_err(translate)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
