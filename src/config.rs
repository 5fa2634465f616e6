//! User configuration file
//!
//! Looked up at `<config dir>/jj-stack/config.toml`, then `~/.jj-stack.toml`.
//! The first file that exists wins; with no file every key takes its default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default remote to push bookmarks to
pub const DEFAULT_REMOTE: &str = "origin";

/// Default revset for merge, ready and close: the stack up to `@`
pub const DEFAULT_REVISIONS: &str = "fork_point(trunk()..@)::@";

const APP_DIR: &str = "jj-stack";
const CONFIG_FILE: &str = "config.toml";
const HOME_CONFIG_FILE: &str = ".jj-stack.toml";

/// Settings read from the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// GitHub token, checked before the gh CLI and environment
    pub github_token: Option<String>,
    /// Remote that bookmarks are tracked against and pushed to
    pub remote: String,
    /// Revset used when a command gets no `-r`
    pub revisions: String,
    /// Mark each PR ready for review before merging it
    pub auto_ready: bool,
    /// Open new PRs as drafts
    pub draft: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            remote: DEFAULT_REMOTE.to_string(),
            revisions: DEFAULT_REVISIONS.to_string(),
            auto_ready: false,
            draft: true,
        }
    }
}

impl Config {
    /// Load from the first config file that exists, or defaults
    pub fn load() -> Result<Self> {
        for path in config_paths() {
            if path.is_file() {
                return Self::load_from(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Candidate config file locations, in priority order
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(HOME_CONFIG_FILE));
    }
    paths
}
