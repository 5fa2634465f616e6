//! Auth command - test and explain authentication

use crate::cli::style::{Stylize, check};
use anstream::println;
use jj_stack::auth::{get_github_auth, test_github_auth};
use jj_stack::config::{Config, config_paths};
use jj_stack::error::Result;
use std::env;

/// Resolve a token and report who it authenticates as
pub async fn run_auth_test() -> Result<()> {
    println!("{}", "Testing GitHub authentication...".muted());
    let config = Config::load()?;
    let auth = get_github_auth(config.github_token.as_deref()).await?;

    let host = env::var("GH_HOST")
        .ok()
        .filter(|h| !h.is_empty() && h != "github.com");
    let login = test_github_auth(&auth, host.as_deref()).await?;

    println!("{} Authenticated as {}", check(), login.accent());
    println!("  Token source: {}", auth.source.to_string().muted());
    if let Some(host) = host {
        println!("  Host: {}", host.muted());
    }
    Ok(())
}

/// Print setup instructions
pub fn run_auth_setup() {
    println!("{}", "GitHub Authentication Setup".emphasis());
    println!();
    println!("Option 1: GitHub CLI (recommended)");
    println!("  Install: https://cli.github.com/");
    println!("  Run: gh auth login");
    println!();
    println!("Option 2: Environment variable");
    println!("  Set GITHUB_TOKEN or GH_TOKEN");
    println!();
    println!("Option 3: Config file");
    for path in config_paths() {
        println!("  {}", path.display().accent());
    }
    println!("  github_token = \"ghp_...\"");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Set GH_HOST to your instance hostname");
}
