//! Stack merge execution

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::merge::{MergeContext, MergeEvent, MergeState, RevisionToMerge};
use crate::platform::PlatformService;
use crate::poll::{CONFIRMATION_INTERVAL, SETTLE_DELAY, pause, poll_until};
use crate::prompt::Confirmer;
use crate::repo::{Vcs, all_revisions_of};
use crate::stack::restack;
use crate::sync::{StackSync, SyncEvent};
use crate::types::Revision;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Initial readiness fetches run concurrently up to this many
pub const BUILD_CONCURRENCY: usize = 5;

/// Options for a merge run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Mark each draft PR ready for review before merging it
    pub auto_ready: bool,
    /// Request drafts for PRs the re-sync has to create
    pub draft: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            auto_ready: false,
            draft: true,
        }
    }
}

/// Result of a merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// PRs merged
    pub merged: usize,
    /// Revisions skipped for having no bookmark
    pub skipped: usize,
}

/// Lets a presentation layer answer the outdated-revision question
///
/// Once confirmed it stays confirmed for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct OutdatedConfirmation(Arc<AtomicBool>);

impl OutdatedConfirmation {
    /// Allow merging to continue
    pub fn confirm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether merging may continue
    pub fn is_confirmed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Merge orchestrator for one stack
pub struct StackMerge<'a> {
    vcs: &'a dyn Vcs,
    platform: &'a dyn PlatformService,
    sync: StackSync<'a>,
    events: EventBus<MergeEvent>,
    options: MergeOptions,
    confirmation: OutdatedConfirmation,
    cancel: CancellationToken,
}

impl<'a> StackMerge<'a> {
    /// Create an orchestrator
    ///
    /// `confirmer` answers questions raised while re-syncing the stack
    /// between merges.
    pub fn new(
        vcs: &'a dyn Vcs,
        platform: &'a dyn PlatformService,
        confirmer: &'a dyn Confirmer,
        options: MergeOptions,
    ) -> Self {
        Self {
            vcs,
            platform,
            sync: StackSync::new(vcs, platform, confirmer).with_draft(options.draft),
            events: EventBus::new(),
            options,
            confirmation: OutdatedConfirmation::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use `cancel` to stop the run at its next wait
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Merge progress
    pub const fn events(&self) -> &EventBus<MergeEvent> {
        &self.events
    }

    /// Progress of the re-sync between merges
    pub const fn sync_events(&self) -> &EventBus<SyncEvent> {
        self.sync.events()
    }

    /// Handle for answering the outdated-revision question
    pub fn confirmation(&self) -> OutdatedConfirmation {
        self.confirmation.clone()
    }

    /// Token that stops the run
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn context(&self) -> MergeContext<'_> {
        MergeContext {
            vcs: self.vcs,
            platform: self.platform,
            events: &self.events,
            cancel: &self.cancel,
        }
    }

    /// Merge every revision in `revset`, oldest first
    pub async fn execute(&self, revset: &str) -> Result<MergeSummary> {
        let revisions = self.vcs.revisions(revset).await?;
        info!(revset, count = revisions.len(), "starting stack merge");

        let Some(tip) = revisions.last().map(|rev| rev.change_id.clone()) else {
            info!("nothing to merge");
            return Ok(MergeSummary::default());
        };

        let ctx = self.context();
        let mut items = self.build(&ctx, revisions).await?;
        self.events
            .publish(MergeEvent::Init(items.iter().map(RevisionToMerge::snapshot).collect()));

        self.await_outdated_confirmation(&items).await?;

        let mut summary = MergeSummary::default();
        let last = items.len() - 1;

        for (index, item) in items.iter_mut().enumerate() {
            let change_id = item.revision().change_id.clone();
            info!(%change_id, "processing revision");
            publish_state(&ctx, item, MergeState::Processing);

            if !item.is_eligible() {
                warn!(%change_id, "no bookmark, skipping");
                publish_state(&ctx, item, MergeState::Skipped);
                summary.skipped += 1;
                continue;
            }

            pause(SETTLE_DELAY, &self.cancel).await?;
            item.refresh(&ctx, true).await?;

            if self.options.auto_ready {
                let pr = item.pr()?;
                if pr.is_draft {
                    info!(pr_number = pr.number, "marking PR ready for review");
                    self.platform.mark_ready_for_review(pr).await?;
                }
            }

            item.merge(&ctx).await?;
            summary.merged += 1;

            let restacked = restack(self.vcs, self.platform, &tip).await?;
            debug!(?restacked, "restacked");

            if index == last {
                debug!("last revision merged");
                break;
            }

            self.sync.sync(&all_revisions_of(&tip), true).await?;
        }

        info!(merged = summary.merged, skipped = summary.skipped, "stack merge complete");
        Ok(summary)
    }

    async fn build(
        &self,
        ctx: &MergeContext<'_>,
        revisions: Vec<Revision>,
    ) -> Result<Vec<RevisionToMerge>> {
        stream::iter(revisions)
            .map(|revision| async move {
                let mut item = RevisionToMerge::new(revision);
                item.refresh(ctx, false).await?;
                Ok::<_, Error>(item)
            })
            .buffered(BUILD_CONCURRENCY)
            .try_collect()
            .await
    }

    async fn await_outdated_confirmation(&self, items: &[RevisionToMerge]) -> Result<()> {
        let outdated: Vec<Revision> = items
            .iter()
            .map(RevisionToMerge::revision)
            .filter(|rev| rev.remote_outdated)
            .cloned()
            .collect();

        if outdated.is_empty() {
            return Ok(());
        }

        warn!(count = outdated.len(), "outdated revisions, waiting for confirmation");
        self.events.publish(MergeEvent::OutdatedRevisions {
            revisions: outdated.clone(),
            confirmed: false,
        });

        let confirmation = &self.confirmation;
        poll_until(CONFIRMATION_INTERVAL, &self.cancel, || async move {
            Ok(confirmation.is_confirmed().then_some(()))
        })
        .await?;

        info!("outdated revisions confirmed");
        self.events.publish(MergeEvent::OutdatedRevisions {
            revisions: outdated,
            confirmed: true,
        });
        Ok(())
    }
}

fn publish_state(ctx: &MergeContext<'_>, item: &RevisionToMerge, state: MergeState) {
    ctx.events.publish(MergeEvent::Update {
        revision: item.revision().clone(),
        pr_number: item.pr().ok().map(|pr| pr.number),
        state,
    });
}
