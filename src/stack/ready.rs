//! Mark a stack's PRs ready for review

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::Vcs;
use tracing::info;

use super::find_prs;

/// Outcome of [`mark_ready`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadySummary {
    /// Draft PRs converted to ready for review
    pub marked: Vec<u64>,
    /// PRs that were not drafts
    pub already_ready: Vec<u64>,
}

/// Mark the PR of every bookmarked revision in `revset` ready for review
///
/// Fails with [`Error::PrNotFound`] if any bookmarked revision has no PR.
pub async fn mark_ready(
    vcs: &dyn Vcs,
    platform: &dyn PlatformService,
    revset: &str,
) -> Result<ReadySummary> {
    let revisions = vcs.revisions(revset).await?;
    let mut summary = ReadySummary::default();

    for (rev, pr) in find_prs(platform, revisions).await? {
        let pr = pr.ok_or_else(|| Error::PrNotFound {
            change_id: rev.change_id.clone(),
        })?;

        if pr.is_draft {
            platform.mark_ready_for_review(&pr).await?;
            info!(pr_number = pr.number, "marked ready for review");
            summary.marked.push(pr.number);
        } else {
            summary.already_ready.push(pr.number);
        }
    }

    Ok(summary)
}
