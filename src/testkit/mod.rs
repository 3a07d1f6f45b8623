//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`database`] - [`RecordingDatabase`], a scriptable [`Database`](crate::port::Database)
//!   double that records every command it is asked to run.
//! - [`host`] - [`FakeHost`], a [`Host`](crate::port::Host) with a settable live
//!   count and a priority-ordered listener registry.
//! - [`config`] - Canonical test configurations (in-memory SQLite, fast retry).

pub mod config;
pub mod database;
pub mod host;

pub use database::RecordingDatabase;
pub use host::FakeHost;
