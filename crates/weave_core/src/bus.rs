//! Broadcast bus
//!
//! Synchronous publish/subscribe for [`ChangeEvent`]s. Observers are called in
//! subscription order, once per publish, on the publishing thread. There is no
//! replay: an observer only sees events published after it subscribed.
//!
//! A panicking observer is isolated: the panic is caught and logged and the
//! remaining observers still receive the event.
//!
//! Handlers may publish other event kinds from inside a delivery. Republishing
//! the same kind from its own handler is not detected and will recurse.

use crate::events::{ChangeEvent, EventKind};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

new_key_type! {
    /// Handle returned by [`BroadcastBus::subscribe`], used to unsubscribe
    pub struct SubscriptionId;
}

/// Observer function type
pub type EventHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Subscription {
    /// `None` receives every kind
    kind: Option<EventKind>,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    /// Subscription order; slot reuse would otherwise reorder observers
    order: Vec<SubscriptionId>,
}

/// Process-wide relay for change notifications
#[derive(Default)]
pub struct BroadcastBus {
    registry: Mutex<Registry>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Observers never run under the lock, so a poisoned registry is still consistent.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Observe one event kind
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.insert(Some(kind), Arc::new(handler))
    }

    /// Observe every event kind
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.insert(None, Arc::new(handler))
    }

    fn insert(&self, kind: Option<EventKind>, handler: EventHandler) -> SubscriptionId {
        let mut registry = self.registry();
        let id = registry.subscriptions.insert(Subscription { kind, handler });
        registry.order.push(id);
        id
    }

    /// Remove an observer. Returns `false` if the handle was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        if registry.subscriptions.remove(id).is_none() {
            return false;
        }
        registry.order.retain(|other| *other != id);
        true
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.registry().subscriptions.len()
    }

    /// Deliver an event to every current observer of its kind.
    ///
    /// Returns the number of observers that handled the event without panicking.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let handlers: SmallVec<[EventHandler; 8]> = {
            let registry = self.registry();
            registry
                .order
                .iter()
                .filter_map(|id| registry.subscriptions.get(*id))
                .filter(|sub| sub.kind.map_or(true, |kind| kind == event.kind))
                .map(|sub| Arc::clone(&sub.handler))
                .collect()
        };

        tracing::trace!(
            "BroadcastBus::publish - {} to {} observer(s)",
            event.kind,
            handlers.len()
        );

        let mut delivered = 0;
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::warn!("observer of {} failed: {}", event.kind, reason);
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for BroadcastBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
