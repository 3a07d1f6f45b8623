//! In-process [`Host`] double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::{EventPriority, Host, JoinListener, PlayerJoin};

struct Registration {
    priority: EventPriority,
    listener: Arc<dyn JoinListener>,
}

/// A host with a settable live count and a listener registry.
///
/// [`FakeHost::dispatch_join`] delivers to listeners in priority order
/// (`Lowest` first), and in registration order within one priority.
#[derive(Default)]
pub struct FakeHost {
    live: AtomicUsize,
    listeners: Mutex<Vec<Registration>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live(count: usize) -> Self {
        let host = Self::new();
        host.set_live(count);
        host
    }

    pub fn set_live(&self, count: usize) {
        self.live.store(count, Ordering::SeqCst);
    }

    /// Deliver a join event to every registered listener.
    pub fn dispatch_join(&self, event: &PlayerJoin) {
        let mut ordered: Vec<(EventPriority, Arc<dyn JoinListener>)> = self
            .listeners
            .lock()
            .iter()
            .map(|r| (r.priority, Arc::clone(&r.listener)))
            .collect();
        // Stable sort keeps registration order within a priority.
        ordered.sort_by_key(|(priority, _)| *priority);

        for (_, listener) in ordered {
            listener.on_join(event);
        }
    }

    /// `(priority, listener name)` for every registration, in registration order.
    pub fn registrations(&self) -> Vec<(EventPriority, &'static str)> {
        self.listeners
            .lock()
            .iter()
            .map(|r| (r.priority, r.listener.name()))
            .collect()
    }
}

impl Host for FakeHost {
    fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn register_join_listener(&self, priority: EventPriority, listener: Arc<dyn JoinListener>) {
        self.listeners.lock().push(Registration { priority, listener });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Tagging {
        tag: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl JoinListener for Tagging {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn on_join(&self, _event: &PlayerJoin) {
            self.seen.lock().push(self.tag);
        }
    }

    #[test]
    fn dispatch_follows_priority_then_registration_order() {
        let host = FakeHost::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener = |tag| {
            Arc::new(Tagging {
                tag,
                seen: Arc::clone(&seen),
            })
        };

        host.register_join_listener(EventPriority::Monitor, listener("monitor"));
        host.register_join_listener(EventPriority::Normal, listener("normal-1"));
        host.register_join_listener(EventPriority::Lowest, listener("lowest"));
        host.register_join_listener(EventPriority::Normal, listener("normal-2"));

        host.dispatch_join(&PlayerJoin::new(Uuid::new_v4(), "Alice"));

        assert_eq!(
            *seen.lock(),
            vec!["lowest", "normal-1", "normal-2", "monitor"]
        );
    }

    #[test]
    fn live_count_is_settable() {
        let host = FakeHost::with_live(3);
        assert_eq!(host.live_count(), 3);
        host.set_live(0);
        assert_eq!(host.live_count(), 0);
    }
}
