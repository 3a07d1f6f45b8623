//! sqlx-backed connection supervisor.
//!
//! Provides [`SqlSupervisor`], the production [`Database`](crate::port::Database)
//! implementation for MySQL and SQLite targets.

mod bind;
mod supervisor;

pub use supervisor::SqlSupervisor;
