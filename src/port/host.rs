//! Host process port.
//!
//! The host is the multi-user server embedding this crate. It delivers
//! user-connect events and answers live population queries.

use std::sync::Arc;

use crate::domain::{PlayerId, PlayerName};

/// Listener ordering on the host event bus.
///
/// Listeners run in ascending order: `Lowest` first, `Monitor` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
    Monitor,
}

/// A user connected to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerJoin {
    pub id: PlayerId,
    pub name: PlayerName,
}

impl PlayerJoin {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<PlayerName>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Handler for user-connect events.
///
/// Called synchronously on the host's primary thread; implementations must
/// not block.
pub trait JoinListener: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    fn on_join(&self, event: &PlayerJoin);
}

/// Host capabilities consumed by the telemetry core.
pub trait Host: Send + Sync {
    /// Number of users currently connected.
    ///
    /// Must be non-blocking and safe to call from any thread: the sampler
    /// calls it from the background runtime.
    fn live_count(&self) -> usize;

    /// Register a join listener at the given priority.
    fn register_join_listener(&self, priority: EventPriority, listener: Arc<dyn JoinListener>);
}
