//! Stack command - show the resolved stack

use crate::cli::context::workspace;
use crate::cli::style::{Stylize, bullet, up_arrow};
use anstream::println;
use jj_stack::config::Config;
use jj_stack::error::Result;
use jj_stack::repo::Vcs;
use std::path::Path;

/// Print the stack, top first
pub async fn run_stack(path: Option<&Path>, revset: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let vcs = workspace(path, &config);
    let revset = revset.unwrap_or(&config.revisions);

    let revisions = vcs.revisions(revset).await?;
    if revisions.is_empty() {
        println!("{}", "No revisions between trunk and @.".muted());
        return Ok(());
    }

    for revision in revisions.iter().rev() {
        let bookmark = revision
            .bookmark
            .as_deref()
            .map_or_else(String::new, |b| format!(" {}", b.accent()));
        let outdated = if revision.remote_outdated {
            format!(" {}", up_arrow())
        } else {
            String::new()
        };
        println!(
            "{} {} {}{bookmark}{outdated}",
            bullet(),
            revision.short_change_id.muted(),
            revision.display_description()
        );
    }
    Ok(())
}
