//! Scriptable [`Database`] double.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::{Condvar, Mutex};

use crate::domain::{Command, ConnectionConfig, Row};
use crate::error::{ConnectionError, ExecutionError};
use crate::port::{ConnectionState, Database};

/// Records every command it is asked to run and answers `Ok(1)`.
///
/// Commands are recorded on arrival, before any scripted latency or
/// failure, so tests see exactly what reached the connection.
#[derive(Default)]
pub struct RecordingDatabase {
    commands: Mutex<Vec<Command>>,
    recorded: Condvar,
    state: Mutex<ConnectionState>,
    open_attempts: AtomicU32,
    fail_open: bool,
    fail_execute: bool,
    latency: Option<Duration>,
}

impl RecordingDatabase {
    /// A closed database whose `open` succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Already open, as if the supervisor had connected.
    pub fn open() -> Self {
        let db = Self::new();
        *db.state.lock() = ConnectionState::Open;
        db
    }

    /// A closed database whose every `open` fails.
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Every `execute` and `fetch_all` fails after recording its command.
    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    /// Delay every command by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    pub fn open_attempts(&self) -> u32 {
        self.open_attempts.load(Ordering::SeqCst)
    }

    /// Block until at least `count` commands were recorded.
    pub fn wait_for_commands(&self, count: usize, timeout: Duration) -> bool {
        self.wait_for(timeout, |commands| commands.len() >= count)
    }

    /// Block until `predicate` holds for the recorded commands, or `timeout`
    /// elapses. Must be called outside the runtime.
    pub fn wait_for<F>(&self, timeout: Duration, predicate: F) -> bool
    where
        F: Fn(&[Command]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut commands = self.commands.lock();
        while !predicate(&commands) {
            if self.recorded.wait_until(&mut commands, deadline).timed_out() {
                return predicate(&commands);
            }
        }
        true
    }

    async fn record(&self, command: &Command) -> Result<(), ExecutionError> {
        self.commands.lock().push(command.clone());
        self.recorded.notify_all();

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if *self.state.lock() != ConnectionState::Open {
            return Err(ExecutionError::NotConnected);
        }
        if self.fail_execute {
            return Err(ExecutionError::Other("scripted execution failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    async fn open(&self, _config: &ConnectionConfig) -> Result<(), ConnectionError> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            *self.state.lock() = ConnectionState::Failed;
            return Err(ConnectionError::Other("scripted open failure".into()));
        }
        *self.state.lock() = ConnectionState::Open;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        *self.state.lock() == ConnectionState::Open
    }

    async fn close(&self) {
        *self.state.lock() = ConnectionState::Closed;
    }

    async fn execute(&self, command: &Command) -> Result<u64, ExecutionError> {
        self.record(command).await?;
        Ok(1)
    }

    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, ExecutionError> {
        self.record(command).await?;
        Ok(Vec::new())
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }
}
