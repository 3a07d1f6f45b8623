//! DataTool - operational telemetry for multi-user server processes.
//!
//! The crate embeds in a host process and persists two kinds of data to SQL:
//!
//! - a single-row **server counter** with the current live population,
//!   refreshed by a periodic sampler
//! - one **player identity** row per unique player, upserted on every join
//!
//! # Architecture
//!
//! - **`port`** - capability traits the core depends on: the connection
//!   supervisor ([`port::Database`]) and the host ([`port::Host`])
//! - **`adapter::sql`** - sqlx-backed supervisor for MySQL and SQLite
//! - **`core`** - command executor, statement builders, schema bootstrap,
//!   sampler and join-event upserter
//! - **`app`** - config resolution, logging and the plugin lifecycle
//!
//! # Features
//!
//! - `testkit` - fakes and canonical configs for integration tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use datatool::app::{DataTool, DEFAULT_CONFIG_PATH};
//! use datatool::port::{EventPriority, Host, JoinListener};
//!
//! struct Server;
//!
//! impl Host for Server {
//!     fn live_count(&self) -> usize {
//!         0
//!     }
//!
//!     fn register_join_listener(&self, _: EventPriority, _: Arc<dyn JoinListener>) {}
//! }
//!
//! let tool = DataTool::enable_from_path(DEFAULT_CONFIG_PATH, Arc::new(Server))?;
//! tool.disable();
//! # Ok::<(), datatool::error::Error>(())
//! ```

pub mod adapter;
pub mod app;
pub mod core;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use app::{DataTool, Settings};
pub use error::{Error, Result};
