//! Merge state machine and events

use crate::events::EventSet;
use crate::types::{MergeData, MergeableState, ReviewDecision, Revision, StatusState};

/// Why a PR can or cannot be merged yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReasons {
    /// GitHub reports no conflicts
    pub mergeable: bool,
    /// Approved, or no review required
    pub approved: bool,
    /// Status check rollup; `None` when the PR has no checks
    pub status_checks: Option<StatusState>,
}

impl MergeReasons {
    /// Evaluate a merge data snapshot
    pub fn evaluate(data: &MergeData) -> Self {
        Self {
            mergeable: data.mergeable == MergeableState::Mergeable,
            approved: matches!(data.review_decision, None | Some(ReviewDecision::Approved)),
            status_checks: data.status_check_rollup,
        }
    }

    /// Whether status checks allow merging
    pub fn checks_passing(&self) -> bool {
        self.status_checks.is_none_or(StatusState::is_passing)
    }

    /// All three conditions hold
    pub fn can_merge(&self) -> bool {
        self.mergeable && self.approved && self.checks_passing()
    }
}

/// Where a revision is in the merge pipeline
///
/// `Init -> Processing -> (Skipped | Syncing <-> WaitingForMergeability ->
/// Merging -> Merged)`. `Skipped` and `Merged` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// Not yet reached
    Init,
    /// Picked up in stack order
    Processing,
    /// Remote PR and readiness data are being fetched
    Syncing,
    /// Readiness was checked; carries the result
    WaitingForMergeability {
        /// Outcome of the latest check
        reasons: MergeReasons,
    },
    /// Merge requested, waiting for GitHub to report it merged
    Merging,
    /// Merged
    Merged,
    /// No bookmark, nothing to merge
    Skipped,
}

impl MergeState {
    /// Whether the revision will not change state again
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Merged | Self::Skipped)
    }
}

impl std::fmt::Display for MergeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Processing => write!(f, "processing"),
            Self::Syncing => write!(f, "syncing"),
            Self::WaitingForMergeability { .. } => write!(f, "waiting for mergeability"),
            Self::Merging => write!(f, "merging"),
            Self::Merged => write!(f, "merged"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// A revision and its PR as known when the merge run started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSnapshot {
    /// The revision
    pub revision: Revision,
    /// Its PR number, if it has a bookmark
    pub pr_number: Option<u64>,
}

/// Events on the merge bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// The stack to merge, oldest first; published once per run
    Init(Vec<MergeSnapshot>),
    /// A revision changed state
    Update {
        /// The revision as last fetched
        revision: Revision,
        /// PR number once fetched
        pr_number: Option<u64>,
        /// New state
        state: MergeState,
    },
    /// Some bookmarks differ from their remote; merging waits for a decision
    OutdatedRevisions {
        /// The outdated revisions
        revisions: Vec<Revision>,
        /// Whether the operator has agreed to continue
        confirmed: bool,
    },
}

/// Names of [`MergeEvent`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeEventName {
    /// [`MergeEvent::Init`]
    Init,
    /// [`MergeEvent::Update`]
    Update,
    /// [`MergeEvent::OutdatedRevisions`]
    OutdatedRevisions,
}

impl EventSet for MergeEvent {
    type Name = MergeEventName;

    fn name(&self) -> MergeEventName {
        match self {
            Self::Init(_) => MergeEventName::Init,
            Self::Update { .. } => MergeEventName::Update,
            Self::OutdatedRevisions { .. } => MergeEventName::OutdatedRevisions,
        }
    }
}
