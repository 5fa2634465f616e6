//! Interactive confirmation
//!
//! Orchestrators ask questions through [`Confirmer`] so that tests and
//! non-interactive runs can answer without a terminal. Terminal prompts
//! block, so async callers go through [`off_runtime`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect};

/// Answers yes/no questions
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Ask `message`; `default` is used when the operator just presses enter
    async fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Prompts on the terminal with dialoguer
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    /// Blocking prompt, for callers already off the async runtime
    pub fn prompt(message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let message = message.to_string();
        off_runtime(move || Self::prompt(&message, default)).await
    }
}

/// Answers every question with a fixed value
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer(pub bool);

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, _message: &str, _default: bool) -> Result<bool> {
        Ok(self.0)
    }
}

/// Run a blocking prompt on the blocking thread pool
pub async fn off_runtime<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("prompt task failed: {e}")))?
}

/// Let the operator tick any of `items`; all start ticked
///
/// Returns the indices of the chosen items.
pub fn select_many(message: &str, items: &[String]) -> Result<Vec<usize>> {
    let defaults = vec![true; items.len()];
    MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .items(items)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            Error::Cancelled
        }
        dialoguer::Error::IO(io) => Error::Internal(format!("prompt failed: {io}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fixed_confirmer_ignores_default() {
        assert!(FixedConfirmer(true).confirm("abandon?", false).await.unwrap());
        assert!(!FixedConfirmer(false).confirm("abandon?", true).await.unwrap());
    }

    // The blocked closure only returns once another task on the same
    // single-threaded runtime has run
    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_prompt_leaves_runtime_free() {
        let (tx, rx) = mpsc::channel();
        let sender = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.send(true).unwrap();
        });

        let answer = off_runtime(move || {
            rx.recv_timeout(Duration::from_secs(5))
                .map_err(|e| Error::Internal(e.to_string()))
        })
        .await
        .unwrap();

        assert!(answer);
        sender.await.unwrap();
    }

    #[tokio::test]
    async fn test_blocking_prompt_panic_is_internal_error() {
        let err = off_runtime::<bool, _>(|| panic!("terminal gone")).await.unwrap_err();
        assert!(matches!(err, Error::Internal(ref msg) if msg.contains("prompt task failed")));
    }

    #[test]
    fn test_interrupted_prompt_is_cancellation() {
        let io = std::io::Error::from(std::io::ErrorKind::Interrupted);
        assert!(prompt_error(dialoguer::Error::IO(io)).is_cancelled());

        let io = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(matches!(
            prompt_error(dialoguer::Error::IO(io)),
            Error::Internal(_)
        ));
    }
}
