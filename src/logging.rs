//! Structured file logging
//!
//! The terminal belongs to progress rendering, so logs go to
//! `<cache dir>/jj-stack/jj-stack.log`. `LOG_LEVEL` takes an `EnvFilter`
//! directive and defaults to `debug`.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_LEVEL: &str = "debug";
const FALLBACK_LEVEL: &str = "warn";

/// Where the log file is written
pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("jj-stack").join("jj-stack.log"))
}

fn open_log_file() -> Option<(PathBuf, File)> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((path, file))
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber
///
/// Returns the log file path, or `None` when the file could not be opened
/// and logging fell back to stderr at `warn`.
pub fn init() -> Option<PathBuf> {
    if let Some((path, file)) = open_log_file() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter(DEFAULT_LEVEL))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            return Some(path);
        }
        return None;
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(FALLBACK_LEVEL))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    None
}
