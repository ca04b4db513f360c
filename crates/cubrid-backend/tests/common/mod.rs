//! Scripted in-memory CUBRID driver for integration tests
//!
//! Every statement the adapter sends is recorded. Result sets and failures
//! are queued up front and consumed in order.

#![allow(dead_code)]

use async_trait::async_trait;
use cubrid_backend::connection::{Driver, DriverConnection, DriverCursor, DriverResult};
use cubrid_backend::error::NativeError;
use cubrid_backend::types::{Row, Value};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Arguments of one `connect` call
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectCall {
    pub url: String,
    pub user: String,
    pub password: String,
    pub charset: String,
}

#[derive(Debug)]
struct State {
    connects: Vec<ConnectCall>,
    executed: Vec<(String, Vec<Value>)>,
    result_sets: VecDeque<Vec<Row>>,
    execute_errors: VecDeque<NativeError>,
    connect_error: Option<NativeError>,
    ping: DriverResult<bool>,
    server_version: String,
    version_calls: usize,
    autocommit: Option<bool>,
    closed_cursors: usize,
    closed_connections: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            connects: Vec::new(),
            executed: Vec::new(),
            result_sets: VecDeque::new(),
            execute_errors: VecDeque::new(),
            connect_error: None,
            ping: Ok(true),
            server_version: "11.2.0.0658".to_string(),
            version_calls: 0,
            autocommit: None,
            closed_cursors: 0,
            closed_connections: 0,
        }
    }
}

/// A mock driver whose state stays inspectable after it is boxed
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<State>>,
}

impl MockDriver {
    /// Create a mock driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result set for the next `execute`
    pub fn with_result(self, rows: Vec<Row>) -> Self {
        self.state.lock().result_sets.push_back(rows);
        self
    }

    /// Make the next `execute` fail
    pub fn with_execute_error(self, error: NativeError) -> Self {
        self.state.lock().execute_errors.push_back(error);
        self
    }

    /// Make `connect` fail
    pub fn with_connect_error(self, error: NativeError) -> Self {
        self.state.lock().connect_error = Some(error);
        self
    }

    /// Set the ping outcome
    pub fn with_ping(self, ping: DriverResult<bool>) -> Self {
        self.state.lock().ping = ping;
        self
    }

    /// Set the reported server version
    pub fn with_server_version(self, version: impl Into<String>) -> Self {
        self.state.lock().server_version = version.into();
        self
    }

    /// Boxed clone for `DatabaseWrapper::new`
    pub fn boxed(&self) -> Box<dyn Driver> {
        Box::new(self.clone())
    }

    pub fn connects(&self) -> Vec<ConnectCall> {
        self.state.lock().connects.clone()
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().executed.clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed().into_iter().map(|(sql, _)| sql).collect()
    }

    pub fn version_calls(&self) -> usize {
        self.state.lock().version_calls
    }

    pub fn autocommit(&self) -> Option<bool> {
        self.state.lock().autocommit
    }

    pub fn closed_cursors(&self) -> usize {
        self.state.lock().closed_cursors
    }

    pub fn closed_connections(&self) -> usize {
        self.state.lock().closed_connections
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn connect(
        &self,
        url: &str,
        user: &str,
        password: &str,
        charset: &str,
    ) -> DriverResult<Box<dyn DriverConnection>> {
        let mut state = self.state.lock();
        if let Some(error) = state.connect_error.clone() {
            return Err(error);
        }
        state.connects.push(ConnectCall {
            url: url.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            charset: charset.to_string(),
        });
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl DriverConnection for MockConnection {
    fn cursor(&self) -> DriverResult<Box<dyn DriverCursor>> {
        Ok(Box::new(MockCursor {
            state: Arc::clone(&self.state),
            rows: VecDeque::new(),
        }))
    }

    async fn ping(&self) -> DriverResult<bool> {
        self.state.lock().ping.clone()
    }

    async fn server_version(&self) -> DriverResult<String> {
        let mut state = self.state.lock();
        state.version_calls += 1;
        Ok(state.server_version.clone())
    }

    async fn set_autocommit(&self, autocommit: bool) -> DriverResult<()> {
        self.state.lock().autocommit = Some(autocommit);
        Ok(())
    }

    async fn close(&self) -> DriverResult<()> {
        self.state.lock().closed_connections += 1;
        Ok(())
    }
}

struct MockCursor {
    state: Arc<Mutex<State>>,
    rows: VecDeque<Row>,
}

#[async_trait]
impl DriverCursor for MockCursor {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<u64> {
        let mut state = self.state.lock();
        state.executed.push((sql.to_string(), params.to_vec()));
        if let Some(error) = state.execute_errors.pop_front() {
            return Err(error);
        }
        self.rows = state.result_sets.pop_front().unwrap_or_default().into();
        Ok(self.rows.len() as u64)
    }

    async fn execute_many(&mut self, sql: &str, param_rows: &[Vec<Value>]) -> DriverResult<u64> {
        let mut state = self.state.lock();
        for params in param_rows {
            state.executed.push((sql.to_string(), params.clone()));
        }
        if let Some(error) = state.execute_errors.pop_front() {
            return Err(error);
        }
        Ok(param_rows.len() as u64)
    }

    async fn fetch_one(&mut self) -> DriverResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }

    async fn fetch_all(&mut self) -> DriverResult<Vec<Row>> {
        Ok(self.rows.drain(..).collect())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.state.lock().closed_cursors += 1;
        Ok(())
    }
}

/// A single-column row
pub fn row(column: &str, value: Value) -> Row {
    Row::new(vec![column.to_string()], vec![value])
}

/// Route adapter logs to the test writer
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cubrid_backend=debug")
        .with_test_writer()
        .try_init();
}
