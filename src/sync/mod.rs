//! Stack synchronization
//!
//! Pushes a bookmark for every revision in the stack, opens or updates its
//! PR against the revision below it, retires PRs that were closed or merged,
//! and keeps the navigation comment on each PR current.

mod events;
mod execute;

pub use events::{SyncEvent, SyncEventName, SyncStatus};
pub use execute::{StackSync, SyncSummary};
