//! Close a stack's PRs

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::Vcs;
use crate::types::{PrState, PullRequest, Revision};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use super::find_prs;

/// PR closes run concurrently up to this many
pub const CLOSE_CONCURRENCY: usize = 5;

/// Open PRs for the revisions in `revset`, top of the stack first
pub async fn open_prs(
    vcs: &dyn Vcs,
    platform: &dyn PlatformService,
    revset: &str,
) -> Result<Vec<(Revision, PullRequest)>> {
    let revisions = vcs.revisions(revset).await?;
    let mut open: Vec<_> = find_prs(platform, revisions)
        .await?
        .into_iter()
        .filter_map(|(rev, pr)| pr.filter(|pr| pr.state == PrState::Open).map(|pr| (rev, pr)))
        .collect();
    open.reverse();
    Ok(open)
}

/// Close the given PRs, then abandon their revisions if asked
pub async fn close_prs(
    vcs: &dyn Vcs,
    platform: &dyn PlatformService,
    selection: &[(Revision, PullRequest)],
    abandon: bool,
) -> Result<Vec<u64>> {
    let closed: Vec<u64> = stream::iter(selection)
        .map(|(_, pr)| async move {
            platform.close_pr(pr.number).await?;
            info!(pr_number = pr.number, "closed PR");
            Ok::<_, Error>(pr.number)
        })
        .buffered(CLOSE_CONCURRENCY)
        .try_collect()
        .await?;

    if abandon {
        let change_ids: Vec<String> = selection
            .iter()
            .map(|(rev, _)| rev.change_id.clone())
            .collect();
        vcs.abandon(&change_ids).await?;
        info!(count = change_ids.len(), "abandoned closed revisions");
    }

    Ok(closed)
}
