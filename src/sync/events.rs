//! Events published during a sync

use crate::events::EventSet;
use crate::types::Revision;

/// Per-revision progress of a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Waiting for its PR to be reconciled
    Pending,
    /// Bookmark is being set and pushed
    Syncing,
    /// A new PR was opened
    Created,
    /// An existing PR was reconciled
    Updated,
    /// The PR was closed or merged; branch deleted and revision abandoned
    Deleted,
    /// Nothing to push, or no branch name could be derived
    Skipped,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Syncing => write!(f, "syncing"),
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Events on the sync bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The resolved stack, oldest ancestor first; published once per run
    Init(Vec<Revision>),
    /// A revision changed status
    Update {
        /// The revision, with any newly assigned bookmark
        revision: Revision,
        /// New status
        status: SyncStatus,
        /// PR number once one is known
        pr_number: Option<u64>,
    },
}

/// Names of [`SyncEvent`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEventName {
    /// [`SyncEvent::Init`]
    Init,
    /// [`SyncEvent::Update`]
    Update,
}

impl EventSet for SyncEvent {
    type Name = SyncEventName;

    fn name(&self) -> SyncEventName {
        match self {
            Self::Init(_) => SyncEventName::Init,
            Self::Update { .. } => SyncEventName::Update,
        }
    }
}
