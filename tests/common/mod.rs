//! Shared test doubles and fixtures

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_platform;
pub mod mock_vcs;

pub use fixtures::*;
pub use mock_platform::MockPlatformService;
pub use mock_vcs::MockVcs;

use jj_stack::events::{EventBus, EventSet, Subscription};
use std::sync::{Arc, Mutex};

/// Collect every event published on `bus` while the subscription lives
pub fn record<E: EventSet + Clone>(bus: &EventBus<E>) -> (Arc<Mutex<Vec<E>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = bus.subscribe_all(move |event: &E| sink.lock().unwrap().push(event.clone()));
    (seen, subscription)
}
