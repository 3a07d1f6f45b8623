//! Database port: the single supervised connection.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Command, ConnectionConfig, Row};
use crate::error::{ConnectionError, ExecutionError};

/// Lifecycle state of the supervised connection handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Closed,
    Open,
    Failed,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection supervisor capability.
///
/// The implementor is the sole owner of connection state. At most one
/// non-closed handle exists per implementor.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`); commands are
///   executed concurrently from background tasks.
/// - `close` is idempotent and never fails.
/// - `execute` and `fetch_all` return [`ExecutionError::NotConnected`] when
///   the state is not [`ConnectionState::Open`].
#[async_trait]
pub trait Database: Send + Sync {
    /// Establish the connection. On failure the state becomes
    /// [`ConnectionState::Failed`] and the driver error is returned.
    async fn open(&self, config: &ConnectionConfig) -> Result<(), ConnectionError>;

    /// True iff the state is open and a liveness probe succeeds.
    async fn is_connected(&self) -> bool;

    /// Release the handle if one exists.
    async fn close(&self);

    /// Run a statement, returning the number of affected rows.
    async fn execute(&self, command: &Command) -> Result<u64, ExecutionError>;

    /// Run a query, returning every row.
    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, ExecutionError>;

    /// Current lifecycle state, without probing.
    fn state(&self) -> ConnectionState;
}
