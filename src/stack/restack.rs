//! Rebase the stack onto trunk after PRs land

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::{Vcs, stack_bookmarks_of};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use super::LOOKUP_CONCURRENCY;

/// What a restack changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestackSummary {
    /// Bookmarks whose PR was closed or merged, abandoned locally
    pub abandoned: Vec<String>,
    /// Chain roots rebased onto trunk
    pub rebased: Vec<String>,
}

/// Fetch, drop revisions whose PR is no longer open, and move each chain in
/// `trunk()..(revset)` onto `trunk()`
pub async fn restack(
    vcs: &dyn Vcs,
    platform: &dyn PlatformService,
    revset: &str,
) -> Result<RestackSummary> {
    vcs.fetch().await?;

    let bookmarks = vcs.bookmarks(&stack_bookmarks_of(revset)).await?;
    debug!(count = bookmarks.len(), "checking stack bookmarks for closed PRs");

    let lookups: Vec<Option<String>> = stream::iter(bookmarks)
        .map(|bookmark| async move {
            let pr = platform.find_pr_by_branch(&bookmark).await?;
            Ok::<_, Error>(pr.filter(|pr| pr.state.is_closed()).map(|_| bookmark))
        })
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await?;

    let mut summary = RestackSummary::default();
    for bookmark in lookups.into_iter().flatten() {
        info!(%bookmark, "abandoning revision with closed PR");
        vcs.abandon(std::slice::from_ref(&bookmark)).await?;
        summary.abandoned.push(bookmark);
    }

    for root in vcs.chain_roots(revset).await? {
        info!(%root, "rebasing onto trunk");
        vcs.rebase(&root, "trunk()").await?;
        summary.rebased.push(root);
    }

    Ok(summary)
}
