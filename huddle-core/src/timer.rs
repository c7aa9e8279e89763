//! Cancellable run-once-after-delay tasks
//!
//! A [`DeferredTask`] is owned by whoever scheduled it. Cancelling is
//! idempotent and cancelling after the task fired does nothing.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to an action scheduled to run once after a delay
#[derive(Debug)]
pub struct DeferredTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DeferredTask {
    /// Run `action` once after `delay` unless cancelled first
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(delay) => action().await,
            }
        });
        Self { token, handle }
    }

    /// Prevent the action from running if it has not started yet
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the task has run to completion or was cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
