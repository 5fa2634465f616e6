//! Error types for jj-stack

use thiserror::Error;

/// Errors that can occur while syncing or merging a stack
#[derive(Debug, Error)]
pub enum Error {
    /// A `jj` invocation failed
    #[error("jj {command} failed: {stderr}")]
    Jj {
        /// The subcommand that was run (e.g. `git push -b feat`)
        command: String,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// The `jj` binary could not be started
    #[error("failed to run jj: {0}")]
    JjUnavailable(#[source] std::io::Error),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// The repository rejected a draft pull request
    #[error("draft pull requests are not supported for this repository")]
    DraftPrsUnsupported,

    /// A revision that should have a pull request has none
    #[error("PR not found for rev: {change_id}")]
    PrNotFound {
        /// Change ID of the offending revision
        change_id: String,
    },

    /// Merge readiness data could not be fetched
    #[error("error getting merge data for PR #{pr_number}: {message}")]
    MergeData {
        /// Pull request number
        pr_number: u64,
        /// Underlying failure
        message: String,
    },

    /// Remote state was read before it was fetched
    #[error("{what} for rev {change_id} has not been fetched yet")]
    NotFetched {
        /// Which piece of state was accessed
        what: &'static str,
        /// Change ID of the revision
        change_id: String,
    },

    /// A revision query resolved to nothing
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// Authentication error
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configuration file error
    #[error("config error: {0}")]
    Config(String),

    /// No GitHub remote found
    #[error("no supported remotes found (GitHub only)")]
    NoSupportedRemotes,

    /// The requested remote does not exist
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// The run was cancelled by the operator
    #[error("cancelled")]
    Cancelled,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl Error {
    /// Returns true if the run was cancelled rather than failing
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for jj-stack operations
pub type Result<T> = std::result::Result<T, Error>;
