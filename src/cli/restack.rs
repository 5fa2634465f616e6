//! Restack command

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use jj_stack::error::Result;
use jj_stack::stack::restack;
use std::path::Path;

/// Drop revisions whose PR is gone and rebase the rest onto trunk
///
/// `all` restacks every mutable chain instead of just the one under `@`.
pub async fn run_restack(path: Option<&Path>, all: bool) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let revset = if all { "mutable()" } else { "@" };

    let summary = restack(&ctx.vcs, ctx.platform(), revset).await?;

    for bookmark in &summary.abandoned {
        println!("  {} {} (PR closed)", "-".muted(), bookmark.muted());
    }
    println!(
        "{} Rebased {} chain(s) onto trunk",
        check(),
        summary.rebased.len().accent()
    );
    Ok(())
}
