//! Close command - close the stack's open PRs

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use jj_stack::error::Result;
use jj_stack::prompt::{off_runtime, select_many};
use jj_stack::stack::{close_prs, open_prs};
use std::path::Path;

/// Run the close command
///
/// Unless `yes` is set the operator picks which PRs to close. Revisions of
/// closed PRs are abandoned unless `keep` is set.
pub async fn run_close(path: Option<&Path>, revset: Option<&str>, yes: bool, keep: bool) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let mut open = open_prs(&ctx.vcs, ctx.platform(), ctx.revset(revset)).await?;

    if open.is_empty() {
        println!("{}", "No open PRs in this stack.".muted());
        return Ok(());
    }

    if !yes {
        let items: Vec<String> = open
            .iter()
            .map(|(rev, pr)| format!("#{} {} ({})", pr.number, pr.title, rev.short_change_id))
            .collect();
        let chosen = off_runtime(move || select_many("PRs to close", &items)).await?;
        open = open
            .into_iter()
            .enumerate()
            .filter(|(index, _)| chosen.contains(index))
            .map(|(_, entry)| entry)
            .collect();
        if open.is_empty() {
            println!("{}", "Nothing selected.".muted());
            return Ok(());
        }
    }

    let closed = close_prs(&ctx.vcs, ctx.platform(), &open, !keep).await?;
    for number in closed {
        println!("{} Closed {}", check(), format!("#{number}").accent());
    }
    if !keep {
        println!("{}", format!("Abandoned {} revision(s)", open.len()).muted());
    }
    Ok(())
}
