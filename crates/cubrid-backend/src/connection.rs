//! Driver boundary for cubrid-backend
//!
//! The adapter never speaks the CUBRID wire protocol itself. It requires a
//! driver implementing these traits:
//! - Driver: Opens connections from a CUBRID connection URL
//! - DriverConnection: Cursors, liveness, server version, autocommit
//! - DriverCursor: Statement execution and row fetching
//!
//! Every driver method reports failures as [`NativeError`]; translation into
//! framework errors happens in the adapter, not in the driver.

use async_trait::async_trait;
use std::fmt;

use crate::config::{BackendConfig, SensitiveString};
use crate::error::NativeError;
use crate::types::{Row, Value};

/// Result type of driver calls
pub type DriverResult<T> = std::result::Result<T, NativeError>;

/// Vendor name reported to the framework
pub const VENDOR: &str = "cubrid";

/// User assumed when none is configured
pub const DEFAULT_USER: &str = "public";

/// Host assumed when none is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Entry point of a CUBRID client library
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a connection.
    ///
    /// `url` has the form `CUBRID:<host>:<port>:<db>:::`; credentials are
    /// passed separately.
    async fn connect(
        &self,
        url: &str,
        user: &str,
        password: &str,
        charset: &str,
    ) -> DriverResult<Box<dyn DriverConnection>>;
}

/// An open driver connection
#[async_trait]
pub trait DriverConnection: Send + Sync {
    /// Open a cursor on this connection
    fn cursor(&self) -> DriverResult<Box<dyn DriverCursor>>;

    /// Check the server is reachable
    async fn ping(&self) -> DriverResult<bool>;

    /// Server version string, e.g. `10.2.0.8797`
    async fn server_version(&self) -> DriverResult<String>;

    /// Switch autocommit on or off
    async fn set_autocommit(&self, autocommit: bool) -> DriverResult<()>;

    /// Close the connection
    async fn close(&self) -> DriverResult<()>;
}

/// A driver cursor
#[async_trait]
pub trait DriverCursor: Send {
    /// Execute a statement with `?` markers, returns affected row count
    async fn execute(&mut self, sql: &str, params: &[Value]) -> DriverResult<u64>;

    /// Execute a statement once per parameter row
    async fn execute_many(&mut self, sql: &str, param_rows: &[Vec<Value>]) -> DriverResult<u64>;

    /// Next row of the current result set
    async fn fetch_one(&mut self) -> DriverResult<Option<Row>>;

    /// Remaining rows of the current result set
    async fn fetch_all(&mut self) -> DriverResult<Vec<Row>>;

    /// Close the cursor
    async fn close(&mut self) -> DriverResult<()>;
}

/// Arguments for [`Driver::connect`], derived from a [`BackendConfig`]
#[derive(Clone, PartialEq)]
pub struct ConnectParams {
    /// CUBRID connection URL
    pub url: String,
    /// User name
    pub user: String,
    /// Password
    pub password: SensitiveString,
    /// Client character set
    pub charset: String,
}

impl ConnectParams {
    /// Build connection arguments from backend settings
    pub fn from_config(config: &BackendConfig) -> Self {
        let user = if config.user.is_empty() {
            DEFAULT_USER.to_string()
        } else {
            config.user.clone()
        };

        Self {
            url: connection_url(config),
            user,
            password: config.password.clone(),
            charset: config.charset.clone(),
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password)
            .field("charset", &self.charset)
            .finish()
    }
}

/// Render the CUBRID connection URL: `CUBRID:<host>:<port>:<db>:::`.
///
/// An empty host becomes `localhost`; an unset port or database name is left
/// out of the URL.
pub fn connection_url(config: &BackendConfig) -> String {
    let mut url = String::from("CUBRID");

    url.push(':');
    if config.host.is_empty() {
        url.push_str(DEFAULT_HOST);
    } else {
        url.push_str(&config.host);
    }

    if let Some(port) = config.port.as_deref().filter(|p| !p.is_empty()) {
        url.push(':');
        url.push_str(port);
    }

    if !config.name.is_empty() {
        url.push(':');
        url.push_str(&config.name);
    }

    url.push_str(":::");
    url
}
