//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the telemetry core and the outside world:
//! the relational store on one side and the host server process on the
//! other. Components receive them as injected `Arc<dyn ...>` capabilities,
//! never through globals, so tests can substitute doubles.
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────┐   JoinListener / live count   ┌──────────────┐
//!   │   Host   │ ─────────────────────────────▶│     Core     │
//!   └──────────┘                               │ (executor,   │
//!                                              │  sampler,    │
//!                                              │  upserter)   │
//!                                              └──────┬───────┘
//!                                                     │ Database
//!                                                     ▼
//!                                              ┌──────────────┐
//!                                              │  SQL adapter │
//!                                              └──────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Database`] - Supervised connection: open, close, health, execute
//! - [`Host`] - Live population and event registration
//! - [`JoinListener`] - Callback for user-connect events

mod database;
mod host;

pub use database::{ConnectionState, Database};
pub use host::{EventPriority, Host, JoinListener, PlayerJoin};
