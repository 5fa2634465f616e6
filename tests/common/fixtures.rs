//! Test data factories for jj-stack types

use jj_stack::types::{
    MergeData, MergeableState, PlatformConfig, PrState, PullRequest, ReviewDecision, Revision,
    StatusState,
};

/// Repository the mocks pretend to host
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "owner".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// Web URL for a PR in [`github_config`]'s repository
pub fn pr_url(number: u64) -> String {
    format!("https://github.com/owner/repo/pull/{number}")
}

/// A revision with no bookmark
pub fn make_revision(change_id: &str, description: &str) -> Revision {
    Revision {
        change_id: change_id.to_string(),
        short_change_id: change_id.chars().take(4).collect(),
        description: description.to_string(),
        bookmark: None,
        remote_outdated: false,
    }
}

/// A revision whose bookmark matches its remote
pub fn make_bookmarked(change_id: &str, description: &str, bookmark: &str) -> Revision {
    Revision {
        bookmark: Some(bookmark.to_string()),
        ..make_revision(change_id, description)
    }
}

/// A revision whose bookmark has moved since it was last pushed
pub fn make_outdated(change_id: &str, description: &str, bookmark: &str) -> Revision {
    Revision {
        remote_outdated: true,
        ..make_bookmarked(change_id, description, bookmark)
    }
}

/// An open, non-draft PR
pub fn make_pr(number: u64, head: &str, base: &str, title: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: pr_url(number),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: title.to_string(),
        state: PrState::Open,
        node_id: Some(format!("PR_node{number}")),
        is_draft: false,
    }
}

/// A PR in the given state
pub fn make_pr_with_state(number: u64, head: &str, state: PrState) -> PullRequest {
    PullRequest {
        state,
        ..make_pr(number, head, "main", head)
    }
}

/// Approved, conflict-free, all checks green
pub fn mergeable() -> MergeData {
    MergeData {
        review_decision: Some(ReviewDecision::Approved),
        mergeable: MergeableState::Mergeable,
        can_be_rebased: true,
        status_check_rollup: Some(StatusState::Success),
    }
}

/// Mergeable except for the check rollup
pub fn with_checks(state: StatusState) -> MergeData {
    MergeData {
        status_check_rollup: Some(state),
        ..mergeable()
    }
}

/// Mergeable except that a review is still required
pub fn awaiting_review() -> MergeData {
    MergeData {
        review_decision: Some(ReviewDecision::ReviewRequired),
        ..mergeable()
    }
}
