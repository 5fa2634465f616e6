//! Platform service factory

use crate::auth::get_github_auth;
use crate::config::Config;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;

/// Create a GitHub service for the repository, resolving a token first
pub async fn create_platform_service(
    platform: &PlatformConfig,
    config: &Config,
) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(config.github_token.as_deref()).await?;
    Ok(Box::new(GitHubService::new(
        &auth.token,
        platform.owner.clone(),
        platform.repo.clone(),
        platform.host.clone(),
    )?))
}
