//! Shared setup for commands that talk to GitHub

use jj_stack::config::Config;
use jj_stack::error::Result;
use jj_stack::platform::{PlatformService, create_platform_service, parse_repo_info};
use jj_stack::repo::{JjCli, Vcs};
use std::path::Path;
use tracing::debug;

/// Everything a command needs once the repository and host are resolved
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// jj driver for the workspace
    pub vcs: JjCli,
    /// GitHub service for the configured remote
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Load config, find the remote's repository and authenticate
    pub async fn new(path: Option<&Path>) -> Result<Self> {
        let config = Config::load()?;
        let vcs = workspace(path, &config);

        let url = vcs.remote_url(&config.remote).await?;
        let platform_config = parse_repo_info(&url)?;
        debug!(
            owner = %platform_config.owner,
            repo = %platform_config.repo,
            remote = %config.remote,
            "resolved repository"
        );

        let platform = create_platform_service(&platform_config, &config).await?;

        Ok(Self {
            config,
            vcs,
            platform,
        })
    }

    /// `revset` if given, otherwise the configured default
    pub fn revset<'a>(&'a self, revset: Option<&'a str>) -> &'a str {
        revset.unwrap_or(&self.config.revisions)
    }

    /// The platform as a trait object
    pub fn platform(&self) -> &dyn PlatformService {
        self.platform.as_ref()
    }
}

/// jj driver for `path` (or the current directory) and the configured remote
pub fn workspace(path: Option<&Path>, config: &Config) -> JjCli {
    JjCli::new(path.map(Path::to_path_buf), config.remote.clone())
}
