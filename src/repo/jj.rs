//! `jj` command-line driver

use crate::error::{Error, Result};
use crate::repo::{Vcs, chain_roots_of};
use crate::types::{GitRemote, Revision};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

const FIELD_SEP: char = '\0';

/// `jj log` template emitting one NUL-separated record per line
pub fn revision_template() -> &'static str {
    concat!(
        r#"change_id ++ "\0" ++ "#,
        r#"change_id.shortest() ++ "\0" ++ "#,
        r#"description.first_line() ++ "\0" ++ "#,
        r#"local_bookmarks.join(",") ++ "\n""#,
    )
}

/// Parse output produced by [`revision_template`]
///
/// jj marks a local bookmark that has diverged from its remote with a
/// trailing `*` (and a conflicted one with `?`). Only the first bookmark of
/// a revision is used, and its `*` decides `remote_outdated`.
pub fn parse_revisions(output: &str) -> Result<Vec<Revision>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split(FIELD_SEP).collect();
            let [change_id, short_change_id, description, bookmarks] = fields[..] else {
                return Err(Error::Parse(format!(
                    "unexpected jj log record ({} fields): {line:?}",
                    fields.len()
                )));
            };

            let first = bookmarks.split(',').map(str::trim).find(|b| !b.is_empty());
            let bookmark = first
                .map(|b| b.trim_end_matches(['*', '?']).to_string())
                .filter(|b| !b.is_empty());
            let remote_outdated = first.is_some_and(|b| b.contains('*'));

            Ok(Revision {
                change_id: change_id.to_string(),
                short_change_id: short_change_id.to_string(),
                description: description.to_string(),
                bookmark,
                remote_outdated,
            })
        })
        .collect()
}

/// Parse `jj git remote list` output (`<name> <url>` per line)
fn parse_remote_list(output: &str) -> Vec<GitRemote> {
    output
        .lines()
        .filter_map(|line| {
            let (name, url) = line.trim().split_once(char::is_whitespace)?;
            Some(GitRemote {
                name: name.to_string(),
                url: url.trim().to_string(),
            })
        })
        .collect()
}

/// Drives the `jj` binary in a workspace
#[derive(Debug, Clone)]
pub struct JjCli {
    workspace: Option<PathBuf>,
    remote: String,
}

impl JjCli {
    /// Create a driver; `workspace` of `None` uses the current directory
    pub fn new(workspace: Option<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workspace,
            remote: remote.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new("jj");
        command.args(["--color", "never", "--no-pager"]).args(args);
        if let Some(ref dir) = self.workspace {
            command.current_dir(dir);
        }

        debug!(args = ?args, "running jj");
        let output = command.output().await.map_err(Error::JjUnavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(args = ?args, %stderr, "jj failed");
            return Err(Error::Jj {
                command: args.join(" "),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn log(&self, revset: &str, template: &str, reversed: bool) -> Result<String> {
        let mut args = vec!["log", "--quiet", "--no-graph", "-r", revset, "-T", template];
        if reversed {
            args.push("--reversed");
        }
        self.run(&args).await
    }
}

#[async_trait]
impl Vcs for JjCli {
    async fn revisions(&self, revset: &str) -> Result<Vec<Revision>> {
        let output = self.log(revset, revision_template(), true).await?;
        let revisions = parse_revisions(&output)?;
        debug!(revset, count = revisions.len(), "resolved revisions");
        Ok(revisions)
    }

    async fn fetch(&self) -> Result<()> {
        self.run(&["git", "fetch", "--remote", &self.remote]).await?;
        Ok(())
    }

    async fn set_bookmark(&self, name: &str, change_id: &str) -> Result<()> {
        self.run(&["bookmark", "set", "-r", change_id, name, "--allow-backwards"])
            .await?;
        Ok(())
    }

    async fn track_bookmark(&self, name: &str) -> Result<()> {
        let remote_ref = format!("{name}@{}", self.remote);
        match self.run(&["bookmark", "track", &remote_ref]).await {
            Ok(_) => Ok(()),
            // A bookmark that was never pushed has no remote counterpart yet
            Err(Error::Jj { stderr, .. })
                if stderr.contains("No such remote bookmark")
                    || stderr.contains("No matching remote bookmarks") =>
            {
                debug!(bookmark = name, "no remote bookmark to track yet");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn push_bookmark(&self, name: &str) -> Result<()> {
        self.run(&["git", "push", "--remote", &self.remote, "-b", name])
            .await?;
        Ok(())
    }

    async fn abandon(&self, revs: &[String]) -> Result<()> {
        if revs.is_empty() {
            return Ok(());
        }
        let mut args = vec!["abandon"];
        args.extend(revs.iter().map(String::as_str));
        self.run(&args).await?;
        Ok(())
    }

    async fn rebase(&self, source: &str, destination: &str) -> Result<()> {
        self.run(&["rebase", "-s", source, "-d", destination]).await?;
        Ok(())
    }

    async fn chain_roots(&self, revset: &str) -> Result<Vec<String>> {
        let output = self
            .log(&chain_roots_of(revset), r#"change_id ++ "\n""#, true)
            .await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    async fn bookmarks(&self, revset: &str) -> Result<Vec<String>> {
        Ok(self
            .revisions(revset)
            .await?
            .into_iter()
            .filter_map(|rev| rev.bookmark)
            .collect())
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        let output = self.run(&["git", "remote", "list"]).await?;
        parse_remote_list(&output)
            .into_iter()
            .find(|r| r.name == remote)
            .map(|r| r.url)
            .ok_or_else(|| Error::RemoteNotFound(remote.to_string()))
    }

    fn remote(&self) -> &str {
        &self.remote
    }
}
