//! Sync command - push the stack and reconcile its PRs

use crate::cli::context::CommandContext;
use crate::cli::progress::attach_sync;
use crate::cli::style::{Stream, Stylize, hyperlink_url};
use anstream::println;
use jj_stack::error::Result;
use jj_stack::prompt::TerminalConfirmer;
use jj_stack::repo::all_revisions_of;
use jj_stack::sync::StackSync;
use std::path::Path;

/// Run the sync command
///
/// Without `-r` the whole stack around `@` is synced, including revisions
/// above it.
pub async fn run_sync(path: Option<&Path>, revset: Option<&str>, abandon_merged: bool) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let revset = revset.map_or_else(|| all_revisions_of("@"), ToString::to_string);

    let confirmer = TerminalConfirmer;
    let sync = StackSync::new(&ctx.vcs, ctx.platform(), &confirmer).with_draft(ctx.config.draft);
    let _progress = attach_sync(sync.events());

    let summary = sync.sync(&revset, abandon_merged).await?;

    if summary.prs.is_empty() {
        println!("{}", "No open PRs in this stack.".muted());
        return Ok(());
    }

    println!();
    for pr in summary.prs.iter().rev() {
        println!(
            "  {} {} {}",
            format!("#{}", pr.number).accent(),
            pr.title,
            hyperlink_url(Stream::Stdout, &pr.html_url).muted()
        );
    }
    Ok(())
}
