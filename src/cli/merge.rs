//! Merge command - merge the stack's PRs bottom up

use crate::cli::context::CommandContext;
use crate::cli::progress::{attach_merge, attach_sync_above};
use crate::cli::style::{Stylize, check, spinner};
use anstream::println;
use jj_stack::error::Result;
use jj_stack::merge::{MergeEvent, MergeEventName, MergeOptions, StackMerge};
use jj_stack::prompt::TerminalConfirmer;
use std::path::Path;
use tracing::{info, warn};

/// Run the merge command
pub async fn run_merge(path: Option<&Path>, revset: Option<&str>, auto_ready: bool) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let revset = ctx.revset(revset).to_string();
    let options = MergeOptions {
        auto_ready: auto_ready || ctx.config.auto_ready,
        draft: ctx.config.draft,
    };

    let confirmer = TerminalConfirmer;
    let merge = StackMerge::new(&ctx.vcs, ctx.platform(), &confirmer, options);

    let bar = spinner("Resolving stack");
    let _merge_progress = attach_merge(merge.events(), &bar);
    let _sync_progress = attach_sync_above(merge.sync_events(), &bar);

    let confirmation = merge.confirmation();
    let cancel = merge.cancellation().clone();
    let gate_bar = bar.clone();
    let gate_cancel = cancel.clone();
    let _gate = merge
        .events()
        .subscribe(MergeEventName::OutdatedRevisions, move |event| {
            let MergeEvent::OutdatedRevisions {
                confirmed: false, ..
            } = event
            else {
                return;
            };
            let confirmation = confirmation.clone();
            let cancel = gate_cancel.clone();
            let bar = gate_bar.clone();
            tokio::task::spawn_blocking(move || {
                let answer = bar.suspend(|| {
                    TerminalConfirmer::prompt("Merge anyway with the remote versions?", false)
                });
                if matches!(answer, Ok(true)) {
                    confirmation.confirm();
                } else {
                    info!("outdated revisions not confirmed, cancelling");
                    cancel.cancel();
                }
            });
        });

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted");
            interrupt.cancel();
        }
    });

    let result = merge.execute(&revset).await;
    bar.finish_and_clear();
    let summary = result?;

    if summary.merged == 0 {
        println!("{}", "Nothing was merged.".muted());
    } else {
        println!(
            "{} {} {} PR(s)",
            check(),
            "Merged".success(),
            summary.merged.accent()
        );
    }
    if summary.skipped > 0 {
        println!(
            "{}",
            format!("Skipped {} revision(s) without a bookmark", summary.skipped).muted()
        );
    }
    Ok(())
}
