//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use crate::app::{ExecutorConfig, LoggingConfig, RetryConfig, SamplerConfig, Settings};
use crate::domain::{ConnectionConfig, Driver, TableNames};

/// A private in-memory SQLite database. Every pool opened from this config
/// gets its own database.
pub fn sqlite_memory() -> ConnectionConfig {
    ConnectionConfig {
        driver: Driver::Sqlite,
        host: String::new(),
        port: 0,
        database: ":memory:".into(),
        username: String::new(),
        password: String::new(),
        use_encryption: false,
        pool_size: 1,
    }
}

/// Single attempt, no backoff.
pub fn no_retry() -> RetryConfig {
    RetryConfig {
        attempts: 1,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

/// Settings for an in-memory SQLite plugin with a fast sampler.
///
/// Override individual fields on the returned struct when a test needs
/// specific timing.
pub fn settings(sample_interval: Duration) -> Settings {
    Settings {
        connection: sqlite_memory(),
        tables: TableNames::default(),
        sampler: SamplerConfig {
            interval: sample_interval,
        },
        executor: ExecutorConfig {
            worker_threads: 1,
            drain_timeout: Duration::from_secs(5),
        },
        retry: no_retry(),
        logging: LoggingConfig::default(),
    }
}
