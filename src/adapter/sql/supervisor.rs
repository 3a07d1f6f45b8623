//! Connection supervisor over a bounded sqlx pool.
//!
//! sqlx connections cannot run statements concurrently, so the single
//! logical handle is a pool capped at `pool_size` connections (default 1).
//! Concurrent background writes queue on the pool instead of opening more
//! connections.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use super::bind;
use crate::domain::{Command, ConnectionConfig, Driver, Row};
use crate::error::{ConnectionError, ExecutionError};
use crate::port::{ConnectionState, Database};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const SQLITE_MEMORY: &str = ":memory:";

#[derive(Clone)]
enum Backend {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl Backend {
    async fn connect(config: &ConnectionConfig) -> Result<Self, sqlx::Error> {
        let pool_size = config.pool_size.max(1);
        match config.driver {
            Driver::MySql => {
                let mut options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.username)
                    .database(&config.database)
                    .ssl_mode(if config.use_encryption {
                        MySqlSslMode::Required
                    } else {
                        MySqlSslMode::Disabled
                    });
                if !config.password.is_empty() {
                    options = options.password(&config.password);
                }
                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .min_connections(1)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .test_before_acquire(true)
                    .connect_with(options)
                    .await?;
                Ok(Self::MySql(pool))
            }
            Driver::Sqlite => {
                let in_memory = config.database == SQLITE_MEMORY;
                let options = if in_memory {
                    SqliteConnectOptions::from_str("sqlite::memory:")?
                } else {
                    SqliteConnectOptions::new()
                        .filename(&config.database)
                        .create_if_missing(true)
                        .journal_mode(SqliteJournalMode::Wal)
                };
                let options = options.busy_timeout(SQLITE_BUSY_TIMEOUT);

                let mut pool_options = SqlitePoolOptions::new()
                    .max_connections(pool_size)
                    .min_connections(1)
                    .acquire_timeout(ACQUIRE_TIMEOUT);
                if in_memory {
                    // The database lives only as long as one of its connections.
                    pool_options = pool_options.idle_timeout(None).max_lifetime(None);
                }
                let pool = pool_options.connect_with(options).await?;
                Ok(Self::Sqlite(pool))
            }
        }
    }

    async fn close(&self) {
        match self {
            Self::MySql(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::MySql(pool) => pool.is_closed(),
            Self::Sqlite(pool) => pool.is_closed(),
        }
    }

    async fn execute(&self, command: &Command) -> Result<u64, sqlx::Error> {
        let result = match self {
            Self::MySql(pool) => bind::mysql(command.sql(), command.params())
                .execute(pool)
                .await?
                .rows_affected(),
            Self::Sqlite(pool) => bind::sqlite(command.sql(), command.params())
                .execute(pool)
                .await?
                .rows_affected(),
        };
        Ok(result)
    }

    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, ExecutionError> {
        match self {
            Self::MySql(pool) => bind::mysql(command.sql(), command.params())
                .fetch_all(pool)
                .await?
                .iter()
                .map(bind::decode_row)
                .collect(),
            Self::Sqlite(pool) => bind::sqlite(command.sql(), command.params())
                .fetch_all(pool)
                .await?
                .iter()
                .map(bind::decode_row)
                .collect(),
        }
    }
}

/// Owns the one supervised connection and its lifecycle state.
pub struct SqlSupervisor {
    backend: RwLock<Option<Backend>>,
    state: RwLock<ConnectionState>,
}

impl SqlSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: RwLock::new(None),
            state: RwLock::new(ConnectionState::Closed),
        }
    }

    fn backend(&self) -> Option<Backend> {
        self.backend.read().clone()
    }
}

impl Default for SqlSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for SqlSupervisor {
    async fn open(&self, config: &ConnectionConfig) -> Result<(), ConnectionError> {
        // Replace rather than leak an existing handle.
        if self.backend().is_some() {
            debug!("Closing existing connection before reopening");
            self.close().await;
        }

        match Backend::connect(config).await {
            Ok(backend) => {
                *self.backend.write() = Some(backend);
                *self.state.write() = ConnectionState::Open;
                info!(driver = %config.driver, target = %config.target(), "Database connection opened");
                Ok(())
            }
            Err(e) => {
                *self.state.write() = ConnectionState::Failed;
                warn!(driver = %config.driver, target = %config.target(), error = %e, "Database connection failed");
                Err(ConnectionError::Open {
                    driver: config.driver.name(),
                    target: config.target(),
                    source: e,
                })
            }
        }
    }

    async fn is_connected(&self) -> bool {
        if *self.state.read() != ConnectionState::Open {
            return false;
        }
        let Some(backend) = self.backend() else {
            return false;
        };
        if backend.is_closed() {
            return false;
        }
        let probe = Command::new("SELECT 1");
        match tokio::time::timeout(PROBE_TIMEOUT, backend.execute(&probe)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Liveness probe failed");
                false
            }
            Err(_) => {
                debug!(timeout_secs = PROBE_TIMEOUT.as_secs(), "Liveness probe timed out");
                false
            }
        }
    }

    async fn close(&self) {
        let backend = self.backend.write().take();
        if let Some(backend) = backend {
            backend.close().await;
            info!("Database connection closed");
        }
        *self.state.write() = ConnectionState::Closed;
    }

    async fn execute(&self, command: &Command) -> Result<u64, ExecutionError> {
        if self.state() != ConnectionState::Open {
            return Err(ExecutionError::NotConnected);
        }
        let backend = self.backend().ok_or(ExecutionError::NotConnected)?;
        Ok(backend.execute(command).await?)
    }

    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, ExecutionError> {
        if self.state() != ConnectionState::Open {
            return Err(ExecutionError::NotConnected);
        }
        let backend = self.backend().ok_or(ExecutionError::NotConnected)?;
        backend.fetch_all(command).await
    }

    fn state(&self) -> ConnectionState {
        *self.state.read()
    }
}
