//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::env;
use std::sync::LazyLock;

// SSH format: git@host:owner/repo.git
static RE_SSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ssh://)?git@[^:/]+[:/](.+?)(?:\.git)?/?$").unwrap());
// HTTPS format: https://host/owner/repo.git
static RE_HTTPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^/]+/(.+?)(?:\.git)?/?$").unwrap());

/// Whether `hostname` is github.com or the GitHub Enterprise host in `GH_HOST`
pub fn is_github_host(hostname: &str) -> bool {
    hostname == "github.com"
        || hostname.ends_with(".github.com")
        || env::var("GH_HOST").is_ok_and(|h| hostname == h)
}

/// Parse repository info (owner/repo) from a GitHub remote URL
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let hostname = extract_hostname(url)
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;
    if !is_github_host(&hostname) {
        return Err(Error::NoSupportedRemotes);
    }

    let path = RE_SSH
        .captures(url)
        .or_else(|| RE_HTTPS.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    let Some((owner, repo)) = path.split_once('/') else {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    }

    let host = (hostname != "github.com").then_some(hostname);

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

fn extract_hostname(url: &str) -> Option<String> {
    // SSH format
    if let Some(rest) = url.strip_prefix("git@") {
        return rest.split(':').next().map(ToString::to_string);
    }

    // HTTPS and ssh:// format
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
