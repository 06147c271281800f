use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A single-trip, broadcast cancellation signal.
///
/// One orchestrator call creates exactly one token and clones it into every
/// stage and provider call it spawns; calling [`CancellationToken::cancel`]
/// once wakes every waiter. There is no reset: a token represents the
/// lifetime of one request.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<Inner>);

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token. Idempotent; subsequent calls are no-ops.
    pub fn cancel(&self) {
        if !self.0.cancelled.swap(true, Ordering::SeqCst) {
            self.0.notify.notify_waiters();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancellationToken::cancel`] has been called.
    /// Resolves immediately if it already has been.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        // `Notify::notified` must be constructed before the cancellation
        // check below to avoid losing a wakeup that lands in between.
        let notified = self.0.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Races `fut` against cancellation and the given timeout, returning
    /// `None` if either fires first.
    pub async fn race<F, T>(&self, timeout: std::time::Duration, fut: F) -> Option<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            () = self.cancelled() => None,
            result = tokio::time::timeout(timeout, fut) => result.ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_immediately_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately once cancelled");
    }

    #[tokio::test]
    async fn cancelled_resolves_once_cancel_is_called() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(200), handle)
            .await
            .expect("waiter should have woken up")
            .unwrap();
    }

    #[tokio::test]
    async fn race_returns_none_once_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result = token
            .race(std::time::Duration::from_secs(5), async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                42
            })
            .await;
        assert!(result.is_none());
    }
}
