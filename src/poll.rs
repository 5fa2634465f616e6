//! Cancellable fixed-interval waiting
//!
//! Every wait in the merge pipeline goes through here so an interrupt can
//! stop a run at any suspension point.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Delay between mergeability checks
pub const MERGEABILITY_INTERVAL: Duration = Duration::from_secs(3);

/// Delay between merge-completion checks
pub const MERGED_INTERVAL: Duration = Duration::from_secs(1);

/// Delay between checks of the outdated-revision confirmation flag
pub const CONFIRMATION_INTERVAL: Duration = Duration::from_millis(500);

/// Delay before processing each revision, so a fresh push registers remotely
pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Sleep for `duration` unless `cancel` fires first
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;

        () = cancel.cancelled() => {
            trace!("pause cancelled");
            Err(Error::Cancelled)
        }
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Run `check` until it yields a value, sleeping `interval` between attempts
///
/// There is no attempt limit; the loop ends when `check` returns
/// `Ok(Some(_))`, when it returns an error, or when `cancel` fires.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(value) = check().await? {
            return Ok(value);
        }
        pause(interval, cancel).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_pause_completes() {
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        pause(SETTLE_DELAY, &cancel).await.unwrap();
        assert!(start.elapsed() >= SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = pause(Duration::from_secs(60), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_retries_at_interval() {
        let cancel = CancellationToken::new();
        let attempts = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let value = poll_until(MERGED_INTERVAL, &cancel, || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((n == 3).then_some(n))
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert!(start.elapsed() >= MERGED_INTERVAL * 2);
        assert!(start.elapsed() < MERGED_INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_propagates_error() {
        let cancel = CancellationToken::new();
        let result: Result<()> = poll_until(MERGED_INTERVAL, &cancel, || async {
            Err(Error::Internal("boom".into()))
        })
        .await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let attempts = AtomicU32::new(0);

        let result: Result<()> = poll_until(CONFIRMATION_INTERVAL, &cancel, || {
            if attempts.fetch_add(1, Ordering::SeqCst) == 2 {
                trigger.cancel();
            }
            async { Ok(None) }
        })
        .await;

        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
