//! Plugin lifecycle.
//!
//! `enable` runs the startup sequence on the host's thread:
//!
//! 1. build the background runtime
//! 2. open the connection (bounded retry) and confirm it is healthy
//! 3. create both tables, synchronously and in order
//! 4. register the join listener, then start the sampler
//!
//! Any failure before step 4 leaves no listener registered and no sampler
//! running. `disable` reverses the sequence.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

use super::config::{ExecutorConfig, RetryConfig, Settings};
use crate::adapter::sql::SqlSupervisor;
use crate::core::{
    counter_from_row, ensure_tables, identity_from_row, Executor, IdentityUpserter,
    PeriodicSampler, Statements,
};
use crate::domain::{ConnectionConfig, CounterRecord, IdentityRecord};
use crate::error::{ConnectionError, LifecycleError, Result};
use crate::port::{Database, EventPriority, Host};

const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// A running DataTool instance. Dropping it without calling
/// [`DataTool::disable`] abandons in-flight writes.
pub struct DataTool {
    runtime: Runtime,
    executor: Executor,
    statements: Statements,
    sampler: PeriodicSampler,
    drain_timeout: Duration,
}

impl DataTool {
    /// Start against the SQL backend selected by `settings`.
    pub fn enable(settings: &Settings, host: Arc<dyn Host>) -> Result<Self> {
        Self::enable_with(settings, host, Arc::new(SqlSupervisor::new()))
    }

    /// Load settings from the config file, install logging, and start.
    pub fn enable_from_path<P: AsRef<Path>>(path: P, host: Arc<dyn Host>) -> Result<Self> {
        let settings = Settings::load(path);
        settings.logging.init();
        Self::enable(&settings, host)
    }

    /// Start against an explicit connection supervisor.
    pub fn enable_with(
        settings: &Settings,
        host: Arc<dyn Host>,
        database: Arc<dyn Database>,
    ) -> Result<Self> {
        match Self::start(settings, host, database) {
            Ok(tool) => {
                info!(
                    driver = %settings.connection.driver,
                    target = %settings.connection.target(),
                    interval_secs = settings.sampler.interval.as_secs(),
                    "DataTool has been started"
                );
                Ok(tool)
            }
            Err(e) => {
                error!(error = %e, "DataTool failed to start");
                Err(e)
            }
        }
    }

    fn start(settings: &Settings, host: Arc<dyn Host>, database: Arc<dyn Database>) -> Result<Self> {
        let runtime = build_runtime(&settings.executor)?;
        let executor = Executor::new(Arc::clone(&database), runtime.handle().clone());

        runtime.block_on(open_with_retry(
            database.as_ref(),
            &settings.connection,
            &settings.retry,
        ))?;

        if !runtime.block_on(database.is_connected()) {
            runtime.block_on(database.close());
            return Err(ConnectionError::Other("connection unhealthy after open".into()).into());
        }

        let statements = Statements::new(settings.connection.driver, settings.tables.clone());
        if let Err(e) = ensure_tables(&executor, &statements) {
            runtime.block_on(database.close());
            return Err(e.into());
        }

        host.register_join_listener(
            EventPriority::Lowest,
            Arc::new(IdentityUpserter::new(executor.clone(), &statements)),
        );

        let sampler = PeriodicSampler::new(
            executor.clone(),
            host,
            &statements,
            settings.sampler.interval,
        );
        sampler.start()?;

        Ok(Self {
            runtime,
            executor,
            statements,
            sampler,
            drain_timeout: settings.executor.drain_timeout,
        })
    }

    /// Stop sampling, wait a bounded time for in-flight writes, close the
    /// connection and shut the runtime down. Must not be called from inside
    /// an async context.
    pub fn disable(self) {
        let Self {
            runtime,
            executor,
            sampler,
            drain_timeout,
            ..
        } = self;

        sampler.stop();

        if !executor.wait_idle(drain_timeout) {
            warn!(
                in_flight = executor.stats().in_flight,
                timeout_ms = drain_timeout.as_millis() as u64,
                "Closing connection with writes still in flight"
            );
        }

        let database = Arc::clone(executor.database());
        runtime.block_on(async move { database.close().await });
        runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

        info!("DataTool has been stopped");
    }

    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    #[must_use]
    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    #[must_use]
    pub fn sampler(&self) -> &PeriodicSampler {
        &self.sampler
    }

    /// Read the server counter row, if a sample has been written yet.
    pub fn counter(&self) -> Result<Option<CounterRecord>> {
        let rows = self
            .executor
            .build(self.statements.select_counter())
            .fetch_sync()?;
        rows.first()
            .map(counter_from_row)
            .transpose()
            .map_err(Into::into)
    }

    /// Read every player identity row in surrogate-key order.
    pub fn identities(&self) -> Result<Vec<IdentityRecord>> {
        let rows = self
            .executor
            .build(self.statements.select_identities())
            .fetch_sync()?;
        rows.iter()
            .map(identity_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(Into::into)
    }
}

fn build_runtime(config: &ExecutorConfig) -> std::result::Result<Runtime, LifecycleError> {
    Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_name("datatool-worker")
        .enable_all()
        .build()
        .map_err(|e| LifecycleError::Runtime(e.to_string()))
}

/// Open the connection, retrying with exponential backoff.
async fn open_with_retry(
    database: &dyn Database,
    config: &ConnectionConfig,
    retry: &RetryConfig,
) -> std::result::Result<(), ConnectionError> {
    let attempts = retry.attempts.max(1);
    let mut delay = retry.initial_backoff;
    let mut attempt = 1;

    loop {
        match database.open(config).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= attempts => {
                if attempts == 1 {
                    return Err(e);
                }
                return Err(ConnectionError::Exhausted {
                    attempts,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Connection attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(retry.max_backoff);
                attempt += 1;
            }
        }
    }
}
