//! Stack-level operations shared by the orchestrators and the CLI
//!
//! Branch naming, the navigation comment, and the housekeeping commands
//! (restack, ready, close) that act on a whole stack at once.

mod close;
mod comment;
mod naming;
mod ready;
mod restack;

pub use close::{CLOSE_CONCURRENCY, close_prs, open_prs};
pub use comment::{
    COMMENT_CONCURRENCY, CommentAction, StackCommentData, StackItem, sync_stack_comments,
    upsert_stack_comment,
};
pub use naming::{CHANGE_ID_PREFIX_LEN, branch_name, kebab_case};
pub use ready::{ReadySummary, mark_ready};
pub use restack::{RestackSummary, restack};

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{PullRequest, Revision};
use futures::stream::{self, StreamExt, TryStreamExt};

/// PR lookups by branch run concurrently up to this many
pub const LOOKUP_CONCURRENCY: usize = 10;

/// Look up the PR for every revision with a bookmark, preserving order
pub async fn find_prs(
    platform: &dyn PlatformService,
    revisions: Vec<Revision>,
) -> Result<Vec<(Revision, Option<PullRequest>)>> {
    stream::iter(revisions.into_iter().filter(|rev| rev.bookmark.is_some()))
        .map(|rev| async move {
            let pr = match rev.bookmark.as_deref() {
                Some(bookmark) => platform.find_pr_by_branch(bookmark).await?,
                None => None,
            };
            Ok::<_, Error>((rev, pr))
        })
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await
}
