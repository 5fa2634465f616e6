//! Stack navigation comment
//!
//! Every PR in a stack of two or more carries one comment listing the whole
//! stack, newest first, with its own entry highlighted. The comment is found
//! again by the data prefix, which also embeds the stack as base64 JSON.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::PullRequest;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::debug;

/// Comment upserts run concurrently up to this many PRs
pub const COMMENT_CONCURRENCY: usize = 10;

const COMMENT_DATA_PREFIX: &str = "<!--- JJ-STACK: ";
const COMMENT_DATA_POSTFIX: &str = " --->";
const STACK_COMMENT_THIS_PR: &str = "👈";

/// Stack comment data embedded in PR comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackCommentData {
    /// Format version
    pub version: u8,
    /// PRs from the bottom of the stack to the top
    pub stack: Vec<StackItem>,
}

/// A single PR in the stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    /// Head branch of the PR
    pub bookmark_name: String,
    /// PR number
    pub pr_number: u64,
    /// PR web URL
    pub pr_url: String,
    /// PR title
    pub title: String,
}

impl From<&PullRequest> for StackItem {
    fn from(pr: &PullRequest) -> Self {
        Self {
            bookmark_name: pr.head_ref.clone(),
            pr_number: pr.number,
            pr_url: pr.html_url.clone(),
            title: pr.title.clone(),
        }
    }
}

/// What an upsert did to a PR's stack comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// A new comment was posted
    Created,
    /// The existing comment was rewritten
    Updated,
    /// The existing comment already had this content
    Unchanged,
    /// The stack is too small; the existing comment was removed
    Deleted,
    /// The stack is too small and there was no comment
    Skipped,
}

impl StackCommentData {
    /// Build data for PRs ordered bottom to top
    pub fn new(prs: &[PullRequest]) -> Self {
        Self {
            version: 0,
            stack: prs.iter().map(StackItem::from).collect(),
        }
    }

    /// Whether navigation is worth showing
    pub fn is_navigable(&self) -> bool {
        self.stack.len() > 1
    }

    /// Render the comment body as seen from `current_pr`
    pub fn render(&self, current_pr: u64) -> Result<String> {
        let encoded = BASE64.encode(serde_json::to_string(self).map_err(|e| {
            Error::Internal(format!("failed to serialize stack data: {e}"))
        })?);

        let mut body = format!("{COMMENT_DATA_PREFIX}{encoded}{COMMENT_DATA_POSTFIX}\n");
        body.push_str("This PR is part of a stack:\n\n");

        // Newest at top, oldest at bottom
        for item in self.stack.iter().rev() {
            if item.pr_number == current_pr {
                let _ = writeln!(
                    body,
                    "* **#{} `{}`** {STACK_COMMENT_THIS_PR}",
                    item.pr_number, item.title
                );
            } else {
                let _ = writeln!(
                    body,
                    "* [#{}]({}) `{}`",
                    item.pr_number, item.pr_url, item.title
                );
            }
        }

        Ok(body)
    }

    /// Recover the data embedded in a comment body
    pub fn parse(body: &str) -> Option<Self> {
        let start = body.find(COMMENT_DATA_PREFIX)? + COMMENT_DATA_PREFIX.len();
        let len = body[start..].find(COMMENT_DATA_POSTFIX)?;
        let decoded = BASE64.decode(body[start..start + len].trim()).ok()?;
        serde_json::from_slice(&decoded).ok()
    }
}

/// Make `pr_number`'s stack comment match `body`
///
/// `None` means the PR should carry no stack comment.
pub async fn upsert_stack_comment(
    platform: &dyn PlatformService,
    pr_number: u64,
    body: Option<&str>,
) -> Result<CommentAction> {
    let comments = platform.list_pr_comments(pr_number).await?;
    let existing = comments
        .iter()
        .find(|c| c.body.contains(COMMENT_DATA_PREFIX));

    let action = match (existing, body) {
        (Some(comment), None) => {
            platform.delete_pr_comment(pr_number, comment.id).await?;
            CommentAction::Deleted
        }
        (None, None) => CommentAction::Skipped,
        (Some(comment), Some(body)) if comment.body.trim_end() == body.trim_end() => {
            CommentAction::Unchanged
        }
        (Some(comment), Some(body)) => {
            platform.update_pr_comment(pr_number, comment.id, body).await?;
            CommentAction::Updated
        }
        (None, Some(body)) => {
            platform.create_pr_comment(pr_number, body).await?;
            CommentAction::Created
        }
    };

    debug!(pr_number, ?action, "stack comment");
    Ok(action)
}

/// Upsert the stack comment on every PR, bottom-to-top order in `prs`
pub async fn sync_stack_comments(
    platform: &dyn PlatformService,
    prs: &[PullRequest],
) -> Result<Vec<(u64, CommentAction)>> {
    let data = StackCommentData::new(prs);

    let bodies = prs
        .iter()
        .map(|pr| {
            let body = if data.is_navigable() {
                Some(data.render(pr.number)?)
            } else {
                None
            };
            Ok((pr.number, body))
        })
        .collect::<Result<Vec<_>>>()?;

    stream::iter(bodies)
        .map(|(pr_number, body)| async move {
            let action = upsert_stack_comment(platform, pr_number, body.as_deref()).await?;
            Ok::<_, Error>((pr_number, action))
        })
        .buffer_unordered(COMMENT_CONCURRENCY)
        .try_collect()
        .await
}
