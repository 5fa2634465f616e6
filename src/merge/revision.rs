//! Per-revision merge driver

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::merge::{MergeEvent, MergeReasons, MergeSnapshot, MergeState};
use crate::platform::PlatformService;
use crate::poll::{MERGEABILITY_INTERVAL, MERGED_INTERVAL, pause, poll_until};
use crate::repo::Vcs;
use crate::types::{MergeData, MergeMethod, PullRequest, Revision};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Collaborators a [`RevisionToMerge`] talks to
#[derive(Clone, Copy)]
pub struct MergeContext<'a> {
    /// Version control
    pub vcs: &'a dyn Vcs,
    /// Code host
    pub platform: &'a dyn PlatformService,
    /// Where state changes are published
    pub events: &'a EventBus<MergeEvent>,
    /// Stops every wait
    pub cancel: &'a CancellationToken,
}

/// A revision being merged, with its PR and readiness once fetched
#[derive(Debug, Clone)]
pub struct RevisionToMerge {
    revision: Revision,
    pr: Option<PullRequest>,
    merge_data: Option<MergeData>,
}

impl RevisionToMerge {
    /// Wrap a revision; nothing is fetched yet
    pub const fn new(revision: Revision) -> Self {
        Self {
            revision,
            pr: None,
            merge_data: None,
        }
    }

    /// The revision as last resolved
    pub const fn revision(&self) -> &Revision {
        &self.revision
    }

    /// The PR; fails if [`Self::refresh`] has not succeeded yet
    pub fn pr(&self) -> Result<&PullRequest> {
        self.pr.as_ref().ok_or_else(|| Error::NotFetched {
            what: "pull request",
            change_id: self.revision.change_id.clone(),
        })
    }

    /// Readiness data; fails if [`Self::refresh`] has not succeeded yet
    pub fn merge_data(&self) -> Result<&MergeData> {
        self.merge_data.as_ref().ok_or_else(|| Error::NotFetched {
            what: "merge data",
            change_id: self.revision.change_id.clone(),
        })
    }

    /// Only revisions with a bookmark have a PR to merge
    pub const fn is_eligible(&self) -> bool {
        self.revision.bookmark.is_some()
    }

    /// What the run's init event reports for this revision
    pub fn snapshot(&self) -> MergeSnapshot {
        MergeSnapshot {
            revision: self.revision.clone(),
            pr_number: self.pr.as_ref().map(|pr| pr.number),
        }
    }

    fn publish(&self, ctx: &MergeContext<'_>, state: MergeState) {
        ctx.events.publish(MergeEvent::Update {
            revision: self.revision.clone(),
            pr_number: self.pr.as_ref().map(|pr| pr.number),
            state,
        });
    }

    /// Re-fetch the PR, its readiness and the revision itself
    ///
    /// Ineligible revisions are left untouched. A missing PR, a bookmark
    /// removed since the last refresh, or a failed readiness query aborts with
    /// an error naming the revision or PR.
    pub async fn refresh(&mut self, ctx: &MergeContext<'_>, publish: bool) -> Result<()> {
        let Some(bookmark) = self.revision.bookmark.clone() else {
            debug!(change_id = %self.revision.change_id, "ineligible, not refreshing");
            return Ok(());
        };

        if publish {
            self.publish(ctx, MergeState::Syncing);
        }

        let Some(pr) = ctx.platform.find_pr_by_branch(&bookmark).await? else {
            let err = Error::PrNotFound {
                change_id: self.revision.change_id.clone(),
            };
            error!(change_id = %self.revision.change_id, branch = %bookmark, "{err}");
            return Err(err);
        };

        let merge_data = ctx
            .platform
            .get_merge_data(pr.number)
            .await
            .map_err(|e| match e {
                Error::MergeData { .. } => e,
                other => Error::MergeData {
                    pr_number: pr.number,
                    message: other.to_string(),
                },
            })
            .inspect_err(|e| error!(pr_number = pr.number, "{e}"))?;

        let revision = ctx
            .vcs
            .revisions(&self.revision.change_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::RevisionNotFound(self.revision.change_id.clone()))?;

        if revision.bookmark.is_none() {
            let err = Error::PrNotFound {
                change_id: revision.change_id.clone(),
            };
            error!(change_id = %revision.change_id, branch = %bookmark, "bookmark removed, {err}");
            return Err(err);
        }

        debug!(
            change_id = %revision.change_id,
            pr_number = pr.number,
            mergeable = ?merge_data.mergeable,
            "refreshed"
        );

        self.revision = revision;
        self.pr = Some(pr);
        self.merge_data = Some(merge_data);
        Ok(())
    }

    /// Block until the PR can be merged, re-fetching every poll interval
    pub async fn wait_for_mergeability(&mut self, ctx: &MergeContext<'_>) -> Result<()> {
        info!(change_id = %self.revision.change_id, "waiting for mergeability");
        loop {
            let reasons = MergeReasons::evaluate(self.merge_data()?);
            self.publish(ctx, MergeState::WaitingForMergeability { reasons });

            if reasons.can_merge() {
                debug!(change_id = %self.revision.change_id, "mergeable");
                return Ok(());
            }

            debug!(change_id = %self.revision.change_id, ?reasons, "not mergeable yet");
            pause(MERGEABILITY_INTERVAL, ctx.cancel).await?;
            self.refresh(ctx, false).await?;
        }
    }

    /// Wait for mergeability, squash-merge, and wait until GitHub reports it
    /// merged
    pub async fn merge(&mut self, ctx: &MergeContext<'_>) -> Result<()> {
        self.wait_for_mergeability(ctx).await?;

        let pr_number = self.pr()?.number;
        info!(pr_number, "merging PR");
        self.publish(ctx, MergeState::Merging);
        ctx.platform.merge_pr(pr_number, MergeMethod::Squash).await?;

        poll_until(MERGED_INTERVAL, ctx.cancel, || async move {
            match ctx.platform.is_merged(pr_number).await {
                Ok(true) => Ok(Some(())),
                Ok(false) => {
                    debug!(pr_number, "not merged yet");
                    Ok(None)
                }
                Err(e) => {
                    debug!(pr_number, error = %e, "merge check failed, polling again");
                    Ok(None)
                }
            }
        })
        .await?;

        info!(pr_number, "PR merged");
        self.publish(ctx, MergeState::Merged);
        Ok(())
    }
}
