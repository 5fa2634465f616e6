//! Sequential stack merging
//!
//! Merges a stack's PRs bottom to top. Each PR waits until it is
//! conflict-free, approved and green, is squash-merged, and then the rest of
//! the stack is restacked and re-synced onto the new trunk before the next
//! PR starts.

mod execute;
mod revision;
mod state;

pub use execute::{MergeOptions, MergeSummary, OutdatedConfirmation, StackMerge};
pub use revision::{MergeContext, RevisionToMerge};
pub use state::{MergeEvent, MergeEventName, MergeReasons, MergeSnapshot, MergeState};
