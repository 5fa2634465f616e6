//! jst - sync and merge stacked PRs for Jujutsu
//!
//! CLI binary for keeping a jj stack's GitHub PRs in step and merging them
//! in order.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::Stylize;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "jst")]
#[command(about = "Stacked PRs for Jujutsu on GitHub")]
#[command(version)]
struct Cli {
    /// Path to jj repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push bookmarks and create or update a PR for each revision
    Sync {
        /// Revset to sync (defaults to the whole stack around @)
        #[arg(short, long)]
        revisions: Option<String>,

        /// Abandon revisions whose PR was merged or closed without asking
        #[arg(short = 'y', long)]
        abandon_merged: bool,
    },

    /// Merge the stack's PRs one by one, oldest first
    Merge {
        /// Revset to merge
        #[arg(short, long)]
        revisions: Option<String>,

        /// Mark draft PRs ready for review before merging
        #[arg(long)]
        auto_ready: bool,
    },

    /// Mark the stack's PRs ready for review
    Ready {
        /// Revset whose PRs to mark
        #[arg(short, long)]
        revisions: Option<String>,
    },

    /// Close the stack's open PRs
    Close {
        /// Revset whose PRs to close
        #[arg(short, long)]
        revisions: Option<String>,

        /// Close every open PR without asking
        #[arg(short, long)]
        yes: bool,

        /// Keep the revisions instead of abandoning them
        #[arg(long)]
        keep: bool,
    },

    /// Drop revisions with closed PRs and rebase the stack onto trunk
    Restack {
        /// Restack every mutable revision, not just the stack under @
        #[arg(long)]
        all: bool,
    },

    /// Print the PR URL for @
    Pr,

    /// Show the stack
    Stack {
        /// Revset to show
        #[arg(short, long)]
        revisions: Option<String>,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

async fn run(cli: Cli) -> jj_stack::Result<()> {
    let path = cli.path.as_deref();

    match cli.command {
        Commands::Sync {
            revisions,
            abandon_merged,
        } => cli::run_sync(path, revisions.as_deref(), abandon_merged).await,
        Commands::Merge {
            revisions,
            auto_ready,
        } => cli::run_merge(path, revisions.as_deref(), auto_ready).await,
        Commands::Ready { revisions } => cli::run_ready(path, revisions.as_deref()).await,
        Commands::Close {
            revisions,
            yes,
            keep,
        } => cli::run_close(path, revisions.as_deref(), yes, keep).await,
        Commands::Restack { all } => cli::run_restack(path, all).await,
        Commands::Pr => cli::run_pr(path).await,
        Commands::Stack { revisions } => cli::run_stack(path, revisions.as_deref()).await,
        Commands::Auth { action } => match action {
            AuthAction::Test => cli::run_auth_test().await,
            AuthAction::Setup => {
                cli::run_auth_setup();
                Ok(())
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_file = jj_stack::logging::init();
    tracing::debug!(log_file = ?log_file, "starting");

    match run(cli).await {
        Err(e) if e.is_cancelled() => {
            anstream::eprintln!("{}", "Cancelled".warn());
            Ok(())
        }
        result => Ok(result?),
    }
}
