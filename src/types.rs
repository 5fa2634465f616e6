//! Core types for jj-stack

use serde::{Deserialize, Serialize};

/// One revision in a stack, as resolved by the revision source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Revision {
    /// Full jj change ID (stable across rewrites)
    pub change_id: String,
    /// Shortest unambiguous prefix of the change ID
    pub short_change_id: String,
    /// First line of the description
    pub description: String,
    /// First local bookmark pointing at this revision
    pub bookmark: Option<String>,
    /// The bookmark has diverged from its remote counterpart
    pub remote_outdated: bool,
}

impl Revision {
    /// Description for display, falling back to a placeholder when empty
    pub fn display_description(&self) -> &str {
        if self.description.is_empty() {
            "(no description)"
        } else {
            &self.description
        }
    }
}

/// Remote pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl PrState {
    /// Closed or merged: the PR no longer accepts changes
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request as reported by the hosting service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// Open, closed or merged
    pub state: PrState,
    /// GraphQL node ID (used for mutations)
    pub node_id: Option<String>,
    /// Whether the PR is a draft
    pub is_draft: bool,
}

/// A comment on a pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// Review decision reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    /// The PR has an approving review
    Approved,
    /// Changes were requested
    ChangesRequested,
    /// A review is required before merging
    ReviewRequired,
}

/// Whether GitHub considers the PR conflict-free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    /// Can be merged
    Mergeable,
    /// Has conflicts
    Conflicting,
    /// Still being computed
    Unknown,
}

/// Aggregated status check state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusState {
    /// A check errored
    Error,
    /// A required check has not reported yet
    Expected,
    /// A check failed
    Failure,
    /// Checks are still running
    Pending,
    /// All checks passed
    Success,
}

impl StatusState {
    /// Only `Success` lets a merge proceed
    pub const fn is_passing(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Expected => write!(f, "expected"),
            Self::Failure => write!(f, "failure"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// Merge readiness snapshot for a single PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeData {
    /// Review decision; `None` when reviews are not required
    pub review_decision: Option<ReviewDecision>,
    /// Conflict state
    pub mergeable: MergeableState,
    /// Whether the PR can be rebase-merged
    pub can_be_rebased: bool,
    /// Status check rollup; `None` when the PR has no checks
    pub status_check_rollup: Option<StatusState>,
}

/// Merge strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Repository coordinates on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
