//! Typed in-process publish/subscribe
//!
//! Orchestrators publish progress to an [`EventBus`]; presentation layers
//! (the CLI, tests) subscribe to the events they care about. Delivery is
//! synchronous and in registration order. Nothing is buffered: a subscriber
//! registered after a publish never sees that event.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

/// A closed set of events carried by one bus
///
/// Each event value reports which named event it is, so subscribers can
/// register for a single name without matching on payloads themselves.
pub trait EventSet: Debug + Send + Sync + 'static {
    /// Discriminant naming each event in the set
    type Name: Copy + Eq + Debug + Send + Sync + 'static;

    /// The name of this event
    fn name(&self) -> Self::Name;
}

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E: EventSet> {
    id: u64,
    /// `None` subscribes to every event in the set
    name: Option<E::Name>,
    handler: Handler<E>,
}

struct Registry<E: EventSet> {
    next_id: u64,
    entries: Vec<Entry<E>>,
}

/// Synchronous typed event bus
///
/// Cloning a bus yields another handle to the same subscriber list.
pub struct EventBus<E: EventSet> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: EventSet> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: EventSet> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventSet> Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn lock<E: EventSet>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    // A panicking handler never runs under the lock, so poisoning is benign
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: EventSet> EventBus<E> {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a handler for one named event
    pub fn subscribe<F>(&self, name: E::Name, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Some(name), Arc::new(handler))
    }

    /// Register a handler for every event on this bus
    pub fn subscribe_all<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(handler))
    }

    fn register(&self, name: Option<E::Name>, handler: Handler<E>) -> Subscription {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(Entry { id, name, handler });

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).entries.retain(|entry| entry.id != id);
                }
            })),
        }
    }

    /// Deliver an event to every current subscriber for its name
    ///
    /// Handlers run on the caller's task after the subscriber list is
    /// snapshotted, so a handler may subscribe or unsubscribe without
    /// deadlocking.
    pub fn publish(&self, event: E) {
        let name = event.name();
        debug!(event = ?name, payload = ?event, "publish");

        let handlers: Vec<Handler<E>> = lock(&self.registry)
            .entries
            .iter()
            .filter(|entry| entry.name.is_none_or(|n| n == name))
            .map(|entry| Arc::clone(&entry.handler))
            .collect();

        for handler in handlers {
            handler(&event);
        }
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).entries.len()
    }
}

/// Handle returned by [`EventBus::subscribe`]
///
/// Dropping it unsubscribes the handler. Call [`Subscription::detach`] to
/// keep the handler for the lifetime of the bus.
#[must_use = "dropping a Subscription immediately unsubscribes the handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the handler now
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the handler registered until the bus itself is dropped
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
