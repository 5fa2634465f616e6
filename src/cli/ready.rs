//! Ready command

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use jj_stack::error::Result;
use jj_stack::stack::mark_ready;
use std::path::Path;

/// Mark every PR in the stack ready for review
pub async fn run_ready(path: Option<&Path>, revset: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let summary = mark_ready(&ctx.vcs, ctx.platform(), ctx.revset(revset)).await?;

    for number in &summary.marked {
        println!("{} {} is ready for review", check(), format!("#{number}").accent());
    }
    if !summary.already_ready.is_empty() {
        let numbers: Vec<String> = summary
            .already_ready
            .iter()
            .map(|n| format!("#{n}"))
            .collect();
        println!("{}", format!("Already ready: {}", numbers.join(", ")).muted());
    }
    if summary.marked.is_empty() && summary.already_ready.is_empty() {
        println!("{}", "No PRs in this stack.".muted());
    }
    Ok(())
}
