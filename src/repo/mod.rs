//! Version control access
//!
//! [`Vcs`] is everything the orchestrators need from jj: resolving a revset
//! into an ordered stack, moving and pushing bookmarks, and rewriting
//! history after merges. [`JjCli`] implements it by running the `jj` binary.

mod jj;

pub use jj::{JjCli, parse_revisions, revision_template};

use crate::error::Result;
use crate::types::Revision;
use async_trait::async_trait;

/// Revset for the whole stack containing `rev`: from where it forks off
/// trunk through every descendant of `rev`
pub fn all_revisions_of(rev: &str) -> String {
    format!("fork_point(trunk()..{rev})::descendants({rev})")
}

/// Revset for every revision from where `revset` forks off trunk upward
pub fn stack_bookmarks_of(revset: &str) -> String {
    format!("fork_point(trunk()..({revset}))::")
}

/// Revset for the root of each chain in `revset` that sits on top of trunk
pub fn chain_roots_of(revset: &str) -> String {
    format!("roots(trunk()..({revset}))")
}

/// Version control capability consumed by sync and merge
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Resolve `revset` into revisions, oldest ancestor first
    async fn revisions(&self, revset: &str) -> Result<Vec<Revision>>;

    /// Fetch from the remote
    async fn fetch(&self) -> Result<()>;

    /// Create or move a local bookmark, allowing backwards moves
    async fn set_bookmark(&self, name: &str, change_id: &str) -> Result<()>;

    /// Track the remote counterpart of a bookmark
    async fn track_bookmark(&self, name: &str) -> Result<()>;

    /// Push a bookmark to the remote
    async fn push_bookmark(&self, name: &str) -> Result<()>;

    /// Abandon revisions
    async fn abandon(&self, revs: &[String]) -> Result<()>;

    /// Rebase `source` and its descendants onto `destination`
    async fn rebase(&self, source: &str, destination: &str) -> Result<()>;

    /// Change IDs of the root of each chain in `trunk()..(revset)`
    async fn chain_roots(&self, revset: &str) -> Result<Vec<String>>;

    /// First local bookmark of each revision in `revset` that has one
    async fn bookmarks(&self, revset: &str) -> Result<Vec<String>>;

    /// URL of the named git remote
    async fn remote_url(&self, remote: &str) -> Result<String>;

    /// Name of the remote bookmarks are tracked against
    fn remote(&self) -> &str;
}
