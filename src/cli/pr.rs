//! Pr command - print the PR URL for `@`

use crate::cli::context::CommandContext;
use crate::cli::style::{Stream, Stylize, hyperlink_url};
use anstream::println;
use jj_stack::error::{Error, Result};
use jj_stack::repo::Vcs;
use std::path::Path;

/// Print the URL of the PR for the working-copy revision
pub async fn run_pr(path: Option<&Path>) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let revision = ctx
        .vcs
        .revisions("@")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::RevisionNotFound("@".to_string()))?;

    let Some(bookmark) = revision.bookmark.as_deref() else {
        println!(
            "{}",
            format!("{} has no bookmark; run `jst sync` first", revision.short_change_id).muted()
        );
        return Ok(());
    };

    match ctx.platform().find_pr_by_branch(bookmark).await? {
        Some(pr) => println!("{}", hyperlink_url(Stream::Stdout, &pr.html_url)),
        None => println!("{}", format!("No PR for {bookmark}").muted()),
    }
    Ok(())
}
