//! Backend configuration
//!
//! [`BackendConfig`] is the settings dictionary the framework hands a database
//! backend: where the server is, who to log in as, and how the framework
//! treats timezones. It is loaded once and threaded explicitly into the
//! codec and dialect; nothing reads ambient settings.
//!
//! # Example
//!
//! ```yaml
//! host: db.internal
//! port: "33000"
//! name: demodb
//! user: dba
//! password: secret
//! use_tz: true
//! time_zone: Asia/Seoul
//! framework_version: "1.11"
//! ```

use chrono_tz::Tz;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use validator::Validate;

use crate::error::{Error, Result};

/// Release of the host framework the backend is configured against.
///
/// Some operations only exist for part of the framework's history; the
/// dialect consults this to decide which shape to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameworkVersion {
    /// Major release
    pub major: u16,
    /// Minor release
    pub minor: u16,
}

impl FrameworkVersion {
    /// Create a version
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for FrameworkVersion {
    fn default() -> Self {
        Self::new(1, 11)
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for FrameworkVersion {
    type Err = Error;

    /// Parse `major.minor`, ignoring any patch component
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let mut next = |what: &str| -> Result<u16> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| {
                    Error::config(format!("invalid framework version '{}': bad {}", s, what))
                })
        };
        let major = next("major")?;
        let minor = next("minor")?;
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for FrameworkVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FrameworkVersion> for String {
    fn from(v: FrameworkVersion) -> Self {
        v.to_string()
    }
}

/// A string that never shows up in logs or config dumps
#[derive(Clone)]
pub struct SensitiveString(SecretString);

impl SensitiveString {
    /// Wrap a sensitive value
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into().into_boxed_str()))
    }

    /// Expose the secret value.
    ///
    /// Use sparingly - only when the actual value is needed (e.g., for authentication).
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the wrapped value is empty
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl Default for SensitiveString {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for SensitiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SensitiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SensitiveString {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl From<&str> for SensitiveString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SensitiveString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for SensitiveString {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("***REDACTED***")
    }
}

impl<'de> Deserialize<'de> for SensitiveString {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

/// CUBRID backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BackendConfig {
    /// Host name, or a socket path when it starts with `/`. Empty means `localhost`.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub host: String,

    /// Broker port; omitted from the connection URL when unset
    #[serde(default)]
    pub port: Option<String>,

    /// Database name
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,

    /// User name (default: `public`)
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: empty)
    #[serde(default)]
    pub password: SensitiveString,

    /// Client character set (default: `utf8`)
    #[serde(default = "default_charset")]
    #[validate(length(min = 1))]
    pub charset: String,

    /// Whether the framework works with timezone-aware datetimes
    #[serde(default)]
    pub use_tz: bool,

    /// IANA name of the connection timezone (default: `UTC`)
    #[serde(default = "default_time_zone")]
    #[validate(length(min = 1))]
    pub time_zone: String,

    /// Framework release the backend targets (default: 1.11)
    #[serde(default)]
    pub framework_version: FrameworkVersion,
}

fn default_user() -> String {
    "public".to_string()
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            name: String::new(),
            user: default_user(),
            password: SensitiveString::default(),
            charset: default_charset(),
            use_tz: false,
            time_zone: default_time_zone(),
            framework_version: FrameworkVersion::default(),
        }
    }
}

impl BackendConfig {
    /// Configuration for a database name, everything else defaulted
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set host (or socket path)
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set port
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Set user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set password
    pub fn with_password(mut self, password: impl Into<SensitiveString>) -> Self {
        self.password = password.into();
        self
    }

    /// Enable or disable timezone-aware datetimes
    pub fn with_use_tz(mut self, use_tz: bool) -> Self {
        self.use_tz = use_tz;
        self
    }

    /// Set the connection timezone
    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = tz.into();
        self
    }

    /// Set the framework version
    pub fn with_framework_version(mut self, version: FrameworkVersion) -> Self {
        self.framework_version = version;
        self
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid backend config: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Connection timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| Error::config(format!("invalid time_zone '{}': {}", self.time_zone, e)))
    }

    /// Validate field rules, the port and the timezone
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::config(format!("invalid backend config: {}", e)))?;

        if let Some(port) = self.port.as_deref().filter(|p| !p.is_empty()) {
            port.parse::<u16>()
                .map_err(|_| Error::config(format!("invalid port '{}'", port)))?;
        }
        self.timezone()?;
        Ok(())
    }
}
