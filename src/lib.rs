//! jj-stack: sync and merge stacked pull requests for Jujutsu on GitHub
//!
//! A stack is a linear chain of jj revisions, each backed by one pull
//! request whose base is the revision below it. This crate keeps those PRs
//! in step with the local chain and merges them in order.
//!
//! - [`sync::StackSync`] pushes bookmarks and creates, updates or retires PRs
//! - [`merge::StackMerge`] waits for each PR to become mergeable, merges it
//!   and re-syncs the rest of the stack
//! - [`events::EventBus`] carries progress to whatever renders it

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod merge;
pub mod platform;
pub mod poll;
pub mod prompt;
pub mod repo;
pub mod stack;
pub mod sync;
pub mod types;

pub use error::{Error, Result};
