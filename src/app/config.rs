//! Configuration file handling and settings resolution.
//!
//! The persisted file is TOML. Its `[database]` table is flattened into a
//! [`ConfigMap`] of strings, and [`Settings::resolve`] turns that map into
//! typed settings. Nothing in this module fails startup: bad input is logged
//! and replaced by the documented default.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::logging::LoggingConfig;
use crate::domain::{
    is_identifier, ConnectionConfig, Driver, TableNames, DEFAULT_PLAYER_TABLE,
    DEFAULT_SERVER_TABLE,
};
use crate::error::ConfigError;

/// Location of the config file relative to the host's working directory.
pub const DEFAULT_CONFIG_PATH: &str = "plugins/DataTool/config.toml";

/// Recognised keys of the `[database]` table.
pub mod keys {
    pub const DRIVER: &str = "driver";
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const DATABASE: &str = "database";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const USE_SSL: &str = "use-ssl";
    pub const POOL_SIZE: &str = "pool-size";
    pub const SERVER_TABLE: &str = "server-table";
    pub const PLAYER_TABLE: &str = "player-table";
    pub const CONNECT_ATTEMPTS: &str = "connect-attempts";
    pub const CONNECT_BACKOFF_MS: &str = "connect-backoff-ms";
    pub const SAMPLE_INTERVAL_SECS: &str = "sample-interval-secs";
    pub const WORKER_THREADS: &str = "worker-threads";
    pub const DRAIN_TIMEOUT_MS: &str = "drain-timeout-ms";
}

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_DATABASE: &str = "data-tool";
const DEFAULT_USERNAME: &str = "root";
const DEFAULT_PASSWORD: &str = "";
const DEFAULT_POOL_SIZE: u32 = 1;
const MAX_POOL_SIZE: u32 = 8;
const DEFAULT_CONNECT_ATTEMPTS: u32 = 1;
const DEFAULT_CONNECT_BACKOFF_MS: u64 = 1_000;
const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);
const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 60;
const DEFAULT_WORKER_THREADS: usize = 2;
const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5_000;

/// Contents written when no config file exists.
pub const DEFAULT_CONFIG: &str = r#"# DataTool configuration

[database]
driver = "mysql"
host = "localhost"
port = 3306
database = "data-tool"
username = "root"
password = ""
use-ssl = false
server-table = "data_tool_server"
player-table = "data_tool_players"
pool-size = 1
connect-attempts = 1
connect-backoff-ms = 1000
sample-interval-secs = 60
worker-threads = 2
drain-timeout-ms = 5000

[logging]
level = "info"
format = "pretty"
"#;

/// String-keyed view of the `[database]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap(BTreeMap<String, String>);

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_table(table: &toml::Table) -> Self {
        let entries = table.iter().filter_map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    warn!(key = %key, kind = other.type_str(), "Ignoring non-scalar config value");
                    return None;
                }
            };
            Some((key.clone(), text))
        });
        Self(entries.collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: toml::Table,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SAMPLE_INTERVAL_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub worker_threads: usize,
    /// Upper bound on waiting for in-flight writes at shutdown.
    pub drain_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            drain_timeout: Duration::from_millis(DEFAULT_DRAIN_TIMEOUT_MS),
        }
    }
}

/// Bounded retry for opening the connection. The delay doubles after each
/// failed attempt up to `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONNECT_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_CONNECT_BACKOFF_MS),
            max_backoff: MAX_CONNECT_BACKOFF,
        }
    }
}

/// Fully resolved, immutable settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub tables: TableNames,
    pub sampler: SamplerConfig,
    pub executor: ExecutorConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Resolve typed settings from the string map. Absent keys take their
    /// defaults, invalid ones are logged and take their defaults too.
    #[must_use]
    pub fn resolve(map: &ConfigMap) -> Self {
        let connection = ConnectionConfig {
            driver: parsed(map, keys::DRIVER, Driver::default()),
            host: map.get_or(keys::HOST, DEFAULT_HOST).to_string(),
            port: parsed(map, keys::PORT, DEFAULT_PORT),
            database: map.get_or(keys::DATABASE, DEFAULT_DATABASE).to_string(),
            username: map.get_or(keys::USERNAME, DEFAULT_USERNAME).to_string(),
            password: map.get_or(keys::PASSWORD, DEFAULT_PASSWORD).to_string(),
            use_encryption: parsed(map, keys::USE_SSL, false),
            pool_size: bounded(
                map,
                keys::POOL_SIZE,
                DEFAULT_POOL_SIZE,
                1..=MAX_POOL_SIZE,
            ),
        };

        let tables = TableNames {
            server_counter: table_name(map, keys::SERVER_TABLE, DEFAULT_SERVER_TABLE),
            player_identity: table_name(map, keys::PLAYER_TABLE, DEFAULT_PLAYER_TABLE),
        };

        let sampler = SamplerConfig {
            interval: Duration::from_secs(bounded(
                map,
                keys::SAMPLE_INTERVAL_SECS,
                DEFAULT_SAMPLE_INTERVAL_SECS,
                1..=u64::MAX,
            )),
        };

        let executor = ExecutorConfig {
            worker_threads: bounded(
                map,
                keys::WORKER_THREADS,
                DEFAULT_WORKER_THREADS,
                1..=usize::MAX,
            ),
            drain_timeout: Duration::from_millis(parsed(
                map,
                keys::DRAIN_TIMEOUT_MS,
                DEFAULT_DRAIN_TIMEOUT_MS,
            )),
        };

        let retry = RetryConfig {
            attempts: bounded(
                map,
                keys::CONNECT_ATTEMPTS,
                DEFAULT_CONNECT_ATTEMPTS,
                1..=u32::MAX,
            ),
            initial_backoff: Duration::from_millis(parsed(
                map,
                keys::CONNECT_BACKOFF_MS,
                DEFAULT_CONNECT_BACKOFF_MS,
            )),
            max_backoff: MAX_CONNECT_BACKOFF,
        };

        Self {
            connection,
            tables,
            sampler,
            executor,
            retry,
            logging: LoggingConfig::default(),
        }
    }

    /// Parse a TOML document and resolve it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(ConfigError::Parse)?;
        let mut settings = Self::resolve(&ConfigMap::from_table(&file.database));
        settings.logging = file.logging;
        Ok(settings)
    }

    /// Load settings from `path`, writing the default file first when it is
    /// missing. Never fails: unreadable or unparsable files resolve to
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            match write_default(path) {
                Ok(()) => info!(path = %path.display(), "Wrote default config file"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not write default config"),
            }
        }

        let content = match std::fs::read_to_string(path).map_err(ConfigError::ReadFile) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default settings");
                return Self::default();
            }
        };

        match Self::from_toml_str(&content) {
            Ok(settings) => {
                debug!(path = %path.display(), "Config loaded");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default settings");
                Self::default()
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&ConfigMap::new())
    }
}

/// Write [`DEFAULT_CONFIG`] to `path`, creating parent directories.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(ConfigError::WriteFile)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(ConfigError::WriteFile)
}

fn parsed<T>(map: &ConfigMap, key: &'static str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = map.get(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            let err = ConfigError::InvalidValue {
                key,
                reason: format!("'{raw}': {e}"),
            };
            warn!(error = %err, default = %default, "Falling back to default");
            default
        }
    }
}

fn bounded<T>(
    map: &ConfigMap,
    key: &'static str,
    default: T,
    range: std::ops::RangeInclusive<T>,
) -> T
where
    T: FromStr + Display + PartialOrd + Copy,
    T::Err: Display,
{
    let value = parsed(map, key, default);
    if range.contains(&value) {
        return value;
    }
    let err = ConfigError::InvalidValue {
        key,
        reason: format!("{value} is outside {}..={}", range.start(), range.end()),
    };
    warn!(error = %err, default = %default, "Falling back to default");
    default
}

fn table_name(map: &ConfigMap, key: &'static str, default: &str) -> String {
    let name = map.get_or(key, default);
    if is_identifier(name) {
        return name.to_string();
    }
    let err = ConfigError::InvalidValue {
        key,
        reason: format!("'{name}' is not a plain SQL identifier"),
    };
    warn!(error = %err, default = %default, "Falling back to default");
    default.to_string()
}
