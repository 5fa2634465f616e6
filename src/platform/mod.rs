//! Code-hosting service
//!
//! Pull request CRUD, merge readiness queries, comments and branch cleanup,
//! behind one trait so orchestration can run against GitHub or a test double.

mod detection;
mod factory;
mod github;

pub use detection::{is_github_host, parse_repo_info};
pub use factory::create_platform_service;
pub use github::{GitHubService, is_draft_unsupported};

use crate::error::Result;
use crate::types::{MergeData, MergeMethod, PlatformConfig, PrComment, PullRequest};
use async_trait::async_trait;

/// Platform service trait for pull request operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find the most recent PR (any state) whose head is `head_branch`
    async fn find_pr_by_branch(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Create a new PR
    ///
    /// Fails with [`crate::error::Error::DraftPrsUnsupported`] when `draft`
    /// is requested on a repository that does not allow drafts.
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        draft: bool,
    ) -> Result<PullRequest>;

    /// Update the title and base branch of an existing PR
    async fn update_pr(&self, pr_number: u64, title: &str, base: &str) -> Result<PullRequest>;

    /// Close a PR without merging
    async fn close_pr(&self, pr_number: u64) -> Result<()>;

    /// Fetch review decision, mergeable state and status check rollup
    async fn get_merge_data(&self, pr_number: u64) -> Result<MergeData>;

    /// Convert a draft PR to ready for review
    async fn mark_ready_for_review(&self, pr: &PullRequest) -> Result<()>;

    /// Request a merge
    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<()>;

    /// Whether the PR has been merged
    async fn is_merged(&self, pr_number: u64) -> Result<bool>;

    /// List comments on a PR
    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Update an existing comment on a PR
    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()>;

    /// Delete a comment on a PR
    async fn delete_pr_comment(&self, pr_number: u64, comment_id: u64) -> Result<()>;

    /// Delete a branch ref on the remote
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Login of the authenticated user
    async fn current_user(&self) -> Result<String>;

    /// The repository's default branch
    async fn default_branch(&self) -> Result<String>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
