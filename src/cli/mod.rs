//! CLI commands
//!
//! Command implementations for the `jst` binary. Each subscribes to the
//! library's event buses for progress and prints the outcome.

mod auth;
mod close;
mod context;
mod merge;
mod pr;
mod progress;
mod ready;
mod restack;
mod stack;
mod style;
mod sync;

pub use auth::{run_auth_setup, run_auth_test};
pub use close::run_close;
pub use merge::run_merge;
pub use pr::run_pr;
pub use ready::run_ready;
pub use restack::run_restack;
pub use stack::run_stack;
pub use style::Stylize;
pub use sync::run_sync;
