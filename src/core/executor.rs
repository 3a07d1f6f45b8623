//! Command executor: the single choke point for statement execution.
//!
//! Commands run in one of two modes:
//!
//! - **sync** - the caller's thread blocks on the background runtime until
//!   the database acknowledges. Reserved for order-sensitive startup work.
//! - **async** - the command is spawned on the background runtime and the
//!   caller returns immediately. Failures are logged here and never reach
//!   the caller (at-most-once, best effort).

use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{trace, warn};

use crate::domain::{Command, Row, Value};
use crate::error::ExecutionError;
use crate::port::Database;

/// Counters for asynchronous commands.
#[derive(Debug, Default)]
struct ExecutorStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicUsize,
    idle: Notify,
}

impl ExecutorStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Acquire),
        }
    }
}

/// Point-in-time view of the executor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: usize,
}

/// Marks one command in flight until dropped, including when the task is
/// cancelled by a runtime shutdown.
struct InFlight(Arc<ExecutorStats>);

impl InFlight {
    fn begin(stats: Arc<ExecutorStats>) -> Self {
        stats.submitted.fetch_add(1, Ordering::Relaxed);
        stats.in_flight.fetch_add(1, Ordering::AcqRel);
        Self(stats)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Builds and runs commands against the supervised connection.
///
/// Cheap to clone; clones share the connection, runtime and counters.
#[derive(Clone)]
pub struct Executor {
    database: Arc<dyn Database>,
    runtime: Handle,
    stats: Arc<ExecutorStats>,
}

impl Executor {
    /// Create an executor that runs background work on `runtime`.
    pub fn new(database: Arc<dyn Database>, runtime: Handle) -> Self {
        Self {
            database,
            runtime,
            stats: Arc::new(ExecutorStats::default()),
        }
    }

    /// Begin a new command from a template with positional `?` placeholders.
    pub fn build(&self, sql: impl Into<String>) -> CommandBuilder<'_> {
        CommandBuilder {
            executor: self,
            command: Command::new(sql),
        }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    #[must_use]
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Block the calling thread on `future` using the background runtime.
    ///
    /// Refuses to run from inside an async context, where blocking would
    /// stall (or panic) the runtime driving the caller.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, ExecutionError> {
        if Handle::try_current().is_ok() {
            return Err(ExecutionError::Other(
                "synchronous execution requested from an async context".into(),
            ));
        }
        Ok(self.runtime.block_on(future))
    }

    /// Wait until no asynchronous command is in flight.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let stats = &self.stats;
        let wait = async {
            loop {
                let mut notified = pin!(stats.idle.notified());
                notified.as_mut().enable();
                if stats.in_flight.load(Ordering::Acquire) == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    /// Blocking form of [`drain`](Self::drain) for the host's primary thread.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.block_on(self.drain(timeout))
            .unwrap_or_else(|_| self.stats.in_flight.load(Ordering::Acquire) == 0)
    }
}

/// A command under construction.
#[must_use = "a command does nothing until executed"]
pub struct CommandBuilder<'a> {
    executor: &'a Executor,
    command: Command,
}

impl CommandBuilder<'_> {
    /// Bind the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.command.push(value.into());
        self
    }

    /// Bind parameters positionally, left to right.
    pub fn with_parameters<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        for value in values {
            self.command.push(value);
        }
        self
    }

    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    fn check(&self) -> Result<(), ExecutionError> {
        let expected = self.command.placeholder_count();
        let actual = self.command.params().len();
        if expected != actual {
            return Err(ExecutionError::ParameterMismatch { expected, actual });
        }
        Ok(())
    }

    /// Run on the calling thread and wait for the affected row count.
    pub fn execute_sync(self) -> Result<u64, ExecutionError> {
        self.check()?;
        let Self { executor, command } = self;
        let database = executor.database.clone();
        executor.block_on(async move { database.execute(&command).await })?
    }

    /// Run a query on the calling thread and wait for its rows.
    pub fn fetch_sync(self) -> Result<Vec<Row>, ExecutionError> {
        self.check()?;
        let Self { executor, command } = self;
        let database = executor.database.clone();
        executor.block_on(async move { database.fetch_all(&command).await })?
    }

    /// Submit to the background runtime and return immediately.
    ///
    /// The outcome is never reported to the caller.
    pub fn execute_async(self) {
        if let Err(e) = self.check() {
            warn!(error = %e, sql = %self.command, "Rejected async command");
            return;
        }
        let Self { executor, command } = self;

        let database = executor.database.clone();
        let stats = executor.stats.clone();
        let guard = InFlight::begin(stats.clone());
        executor.runtime.spawn(async move {
            let _guard = guard;
            match database.execute(&command).await {
                Ok(rows) => {
                    stats.completed.fetch_add(1, Ordering::Relaxed);
                    trace!(rows, sql = %command, "Async command applied");
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, sql = %command, "Async command failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::database::RecordingDatabase;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn executor(rt: &tokio::runtime::Runtime, db: Arc<RecordingDatabase>) -> Executor {
        Executor::new(db, rt.handle().clone())
    }

    #[test]
    fn execute_sync_returns_rows_affected() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open());
        let exec = executor(&rt, db.clone());

        let rows = exec
            .build("UPDATE t SET a = ? WHERE b = ?")
            .bind(1)
            .bind("x")
            .execute_sync()
            .unwrap();

        assert_eq!(rows, 1);
        let recorded = db.commands();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].params(), &[Value::Int(1), Value::Text("x".into())]);
    }

    #[test]
    fn parameter_count_must_match_placeholders() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open());
        let exec = executor(&rt, db.clone());

        let result = exec.build("INSERT INTO t VALUES (?, ?)").bind(1).execute_sync();

        assert!(matches!(
            result,
            Err(ExecutionError::ParameterMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(db.commands().is_empty());
    }

    #[test]
    fn execute_sync_propagates_failures() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open().failing_execute());
        let exec = executor(&rt, db);

        let result = exec.build("CREATE TABLE t (a INT)").execute_sync();
        assert!(result.is_err());
    }

    #[test]
    fn execute_async_swallows_failures() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open().failing_execute());
        let exec = executor(&rt, db.clone());

        exec.build("INSERT INTO t VALUES (?)")
            .with_parameters([Value::from(7)])
            .execute_async();

        assert!(exec.wait_idle(Duration::from_secs(5)));
        let stats = exec.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(db.commands().len(), 1);
    }

    #[test]
    fn execute_async_does_not_wait_for_completion() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open().with_latency(Duration::from_millis(200)));
        let exec = executor(&rt, db);

        let started = std::time::Instant::now();
        exec.build("INSERT INTO t VALUES (1)").execute_async();
        assert!(started.elapsed() < Duration::from_millis(150));

        assert!(exec.wait_idle(Duration::from_secs(5)));
        assert_eq!(exec.stats().completed, 1);
    }

    #[test]
    fn mismatched_async_command_is_never_submitted() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open());
        let exec = executor(&rt, db.clone());

        exec.build("INSERT INTO t VALUES (?)").execute_async();

        assert!(exec.wait_idle(Duration::from_secs(1)));
        assert_eq!(exec.stats().submitted, 0);
        assert!(db.commands().is_empty());
    }

    #[test]
    fn wait_idle_times_out_while_commands_run() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open().with_latency(Duration::from_millis(500)));
        let exec = executor(&rt, db);

        exec.build("INSERT INTO t VALUES (1)").execute_async();
        assert!(!exec.wait_idle(Duration::from_millis(20)));
        assert!(exec.wait_idle(Duration::from_secs(5)));
    }

    #[test]
    fn block_on_refuses_async_context() {
        let rt = runtime();
        let db = Arc::new(RecordingDatabase::open());
        let exec = executor(&rt, db);
        let inner = exec.clone();

        let result = rt.block_on(async move { inner.build("SELECT 1").execute_sync() });
        assert!(matches!(result, Err(ExecutionError::Other(_))));
    }
}
