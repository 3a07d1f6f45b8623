//! Periodic population sampler.
//!
//! ```text
//! Idle ──start()──▶ Running ──stop()──▶ Stopped
//!   └───────────────stop()──────────────▲
//! ```
//!
//! Each tick reads the host's live count and submits an async upsert of the
//! single counter row. Ticks are spaced relative to the previous one, not
//! to wall-clock boundaries, and the first tick fires immediately.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::executor::Executor;
use super::statement::Statements;
use crate::domain::CounterRecord;
use crate::error::LifecycleError;
use crate::port::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
    Stopped,
}

impl SamplerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Inner {
    state: SamplerState,
    // Dropping the sender ends the tick loop.
    shutdown: Option<mpsc::Sender<()>>,
}

/// Samples the live user count on a fixed interval.
pub struct PeriodicSampler {
    executor: Executor,
    host: Arc<dyn Host>,
    sql: Arc<str>,
    interval: Duration,
    inner: Mutex<Inner>,
}

impl PeriodicSampler {
    pub fn new(
        executor: Executor,
        host: Arc<dyn Host>,
        statements: &Statements,
        interval: Duration,
    ) -> Self {
        Self {
            executor,
            host,
            sql: Arc::from(statements.upsert_counter()),
            interval,
            inner: Mutex::new(Inner {
                state: SamplerState::Idle,
                shutdown: None,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> SamplerState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule the recurring tick on the background runtime.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock();
        if inner.state != SamplerState::Idle {
            return Err(LifecycleError::SamplerNotIdle(inner.state.as_str()));
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let executor = self.executor.clone();
        let host = self.host.clone();
        let sql = self.sql.clone();
        let period = self.interval;

        self.executor.runtime().spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        debug!("Sampler loop exiting");
                        break;
                    }
                    _ = timer.tick() => {
                        sample(&executor, host.as_ref(), &sql);
                    }
                }
            }
        });

        inner.state = SamplerState::Running;
        inner.shutdown = Some(shutdown_tx);
        info!(interval_secs = period.as_secs_f64(), "Sampler started");
        Ok(())
    }

    /// Cancel future ticks. In-flight writes are not awaited.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.state == SamplerState::Stopped {
            return;
        }
        inner.shutdown = None;
        inner.state = SamplerState::Stopped;
        info!("Sampler stopped");
    }
}

impl Drop for PeriodicSampler {
    fn drop(&mut self) {
        self.inner.get_mut().shutdown = None;
    }
}

/// One tick: read the live count and submit the counter upsert.
fn sample(executor: &Executor, host: &dyn Host, sql: &str) {
    let observed = host.live_count();
    let record = CounterRecord::new(u32::try_from(observed).unwrap_or(u32::MAX));
    debug!(player_count = record.player_count, "Sampled live users");

    executor
        .build(sql)
        .with_parameters(Statements::counter_params(record))
        .execute_async();
}
