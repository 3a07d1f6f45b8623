//! Telemetry core: command execution, schema bootstrap, and the two write
//! paths (periodic counter sampling and join-event identity upserts).

mod executor;
mod join;
mod sampler;
mod schema;
mod statement;

pub use executor::{CommandBuilder, Executor, StatsSnapshot};
pub use join::IdentityUpserter;
pub use sampler::{PeriodicSampler, SamplerState};
pub use schema::ensure_tables;
pub use statement::{counter_from_row, identity_from_row, Statements};
