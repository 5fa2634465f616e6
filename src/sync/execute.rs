//! Sync execution
//!
//! Three passes over the stack, oldest revision first:
//! 1. push bookmarks (sequential: each branch builds on the one below)
//! 2. reconcile PRs (sequential: each PR's base is the previous branch)
//! 3. upsert navigation comments (concurrent, independent per PR)

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::platform::PlatformService;
use crate::prompt::Confirmer;
use crate::repo::Vcs;
use crate::stack::{branch_name, sync_stack_comments};
use crate::sync::{SyncEvent, SyncStatus};
use crate::types::{PullRequest, Revision};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Result of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Bookmarks that were pushed
    pub pushed: Vec<String>,
    /// PRs that were created
    pub created: Vec<u64>,
    /// PRs that already existed and were reconciled
    pub updated: Vec<u64>,
    /// Change IDs whose PR was closed or merged
    pub deleted: Vec<String>,
    /// Open PRs in stack order, oldest first
    pub prs: Vec<PullRequest>,
}

/// Stack sync orchestrator
///
/// One instance may run several syncs; the draft-support flag learned from
/// the host persists across them.
pub struct StackSync<'a> {
    vcs: &'a dyn Vcs,
    platform: &'a dyn PlatformService,
    confirmer: &'a dyn Confirmer,
    events: EventBus<SyncEvent>,
    draft: AtomicBool,
}

impl<'a> StackSync<'a> {
    /// Create an orchestrator that requests draft PRs
    pub fn new(
        vcs: &'a dyn Vcs,
        platform: &'a dyn PlatformService,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            vcs,
            platform,
            confirmer,
            events: EventBus::new(),
            draft: AtomicBool::new(true),
        }
    }

    /// Whether new PRs are opened as drafts
    #[must_use]
    pub fn with_draft(self, draft: bool) -> Self {
        self.draft.store(draft, Ordering::SeqCst);
        self
    }

    /// The bus progress is published on
    pub const fn events(&self) -> &EventBus<SyncEvent> {
        &self.events
    }

    /// Whether the next PR will be requested as a draft
    pub fn requests_drafts(&self) -> bool {
        self.draft.load(Ordering::SeqCst)
    }

    fn publish(&self, revision: &Revision, status: SyncStatus, pr_number: Option<u64>) {
        self.events.publish(SyncEvent::Update {
            revision: revision.clone(),
            status,
            pr_number,
        });
    }

    /// Sync every revision in `revset`
    ///
    /// With `abandon_merged`, revisions whose PR was closed or merged are
    /// abandoned without asking.
    pub async fn sync(&self, revset: &str, abandon_merged: bool) -> Result<SyncSummary> {
        let mut revisions = self.vcs.revisions(revset).await?;
        info!(revset, count = revisions.len(), "syncing stack");
        self.events.publish(SyncEvent::Init(revisions.clone()));

        let mut summary = SyncSummary::default();
        self.push_bookmarks(&mut revisions, &mut summary).await?;
        self.reconcile_prs(&revisions, abandon_merged, &mut summary)
            .await?;

        sync_stack_comments(self.platform, &summary.prs).await?;

        info!(
            created = summary.created.len(),
            updated = summary.updated.len(),
            deleted = summary.deleted.len(),
            "sync complete"
        );
        Ok(summary)
    }

    async fn push_bookmarks(
        &self,
        revisions: &mut [Revision],
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let mut login: Option<String> = None;

        for revision in revisions.iter_mut() {
            let has_bookmark = revision.bookmark.is_some();
            if has_bookmark && !revision.remote_outdated {
                debug!(change_id = %revision.change_id, "bookmark up to date");
                self.publish(revision, SyncStatus::Skipped, None);
                continue;
            }

            let name = if has_bookmark {
                revision.bookmark.clone()
            } else {
                if login.is_none() {
                    login = Some(self.platform.current_user().await?);
                }
                login.as_deref().and_then(|login| branch_name(login, revision))
            };

            let Some(name) = name else {
                debug!(change_id = %revision.change_id, "no branch name derivable");
                self.publish(revision, SyncStatus::Skipped, None);
                continue;
            };

            self.publish(revision, SyncStatus::Syncing, None);
            debug!(change_id = %revision.change_id, branch = %name, "pushing bookmark");

            self.vcs.set_bookmark(&name, &revision.change_id).await?;
            self.vcs.track_bookmark(&name).await?;
            self.vcs.push_bookmark(&name).await?;

            revision.bookmark = Some(name.clone());
            summary.pushed.push(name);
        }

        Ok(())
    }

    async fn reconcile_prs(
        &self,
        revisions: &[Revision],
        abandon_merged: bool,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let default_branch = self.platform.default_branch().await?;
        // Branch of the nearest revision below that still has an open PR
        let mut base: Option<String> = None;

        for revision in revisions {
            let Some(ref bookmark) = revision.bookmark else {
                continue;
            };
            self.publish(revision, SyncStatus::Pending, None);

            let target_base = base.as_deref().unwrap_or(&default_branch);
            let title = if revision.description.is_empty() {
                bookmark.as_str()
            } else {
                revision.description.as_str()
            };

            match self.platform.find_pr_by_branch(bookmark).await? {
                Some(pr) if pr.state.is_closed() => {
                    self.retire(revision, bookmark, &pr, abandon_merged).await?;
                    summary.deleted.push(revision.change_id.clone());
                }
                Some(pr) => {
                    let pr = if pr.title == title && pr.base_ref == target_base {
                        debug!(pr_number = pr.number, "PR already current");
                        pr
                    } else {
                        self.platform.update_pr(pr.number, title, target_base).await?
                    };
                    self.publish(revision, SyncStatus::Updated, Some(pr.number));
                    summary.updated.push(pr.number);
                    base = Some(bookmark.clone());
                    summary.prs.push(pr);
                }
                None => {
                    let pr = self.create_pr(bookmark, target_base, title).await?;
                    info!(pr_number = pr.number, branch = %bookmark, base = target_base, "created PR");
                    self.publish(revision, SyncStatus::Created, Some(pr.number));
                    summary.created.push(pr.number);
                    base = Some(bookmark.clone());
                    summary.prs.push(pr);
                }
            }
        }

        Ok(())
    }

    /// Delete the branch of a closed or merged PR and abandon its revision
    async fn retire(
        &self,
        revision: &Revision,
        bookmark: &str,
        pr: &PullRequest,
        abandon_merged: bool,
    ) -> Result<()> {
        info!(pr_number = pr.number, state = %pr.state, branch = bookmark, "retiring PR");

        if let Err(e) = self.platform.delete_branch(bookmark).await {
            warn!(branch = bookmark, error = %e, "could not delete remote branch");
        }

        let confirmed = abandon_merged
            || self.confirmer.confirm(
                &format!(
                    "PR #{} is {}. Abandon {} ({})?",
                    pr.number,
                    pr.state,
                    revision.short_change_id,
                    revision.display_description()
                ),
                true,
            )
            .await?;

        if confirmed {
            self.vcs
                .abandon(std::slice::from_ref(&revision.change_id))
                .await?;
        } else {
            info!(change_id = %revision.change_id, "kept revision with retired PR");
        }

        self.publish(revision, SyncStatus::Deleted, Some(pr.number));
        Ok(())
    }

    /// Create a PR, retrying once; a draft rejection turns drafts off for
    /// the rest of this orchestrator's life
    async fn create_pr(&self, head: &str, base: &str, title: &str) -> Result<PullRequest> {
        let draft = self.requests_drafts();
        match self.platform.create_pr(head, base, title, draft).await {
            Ok(pr) => Ok(pr),
            Err(err) => {
                if matches!(err, Error::DraftPrsUnsupported) {
                    info!("draft PRs unsupported, creating regular PRs from now on");
                    self.draft.store(false, Ordering::SeqCst);
                } else {
                    warn!(head, error = %err, "PR creation failed, retrying");
                }
                self.platform
                    .create_pr(head, base, title, self.requests_drafts())
                    .await
            }
        }
    }
}
