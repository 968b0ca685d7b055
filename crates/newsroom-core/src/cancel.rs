//! Cooperative cancellation for suspending calls (spec §5). Wraps
//! `tokio_util`-style semantics without the extra dependency: a clone-able
//! flag plus a notify, checked at every suspension point and propagated
//! from the owning pipeline run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    UserRequested,
    Timeout,
}

#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    reason: std::sync::Mutex<Option<CancelReason>>,
    notify: Notify,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                reason: std::sync::Mutex::new(None),
                notify: Notify::new(),
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<CancelReason> {
        *self.inner.reason.lock().expect("cancel token lock poisoned")
    }

    pub fn cancel(&self, reason: CancelReason) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            *self.inner.reason.lock().expect("cancel token lock poisoned") = Some(reason);
            self.inner.notify.notify_waiters();
        }
    }

    /// Suspend until cancelled. Call this concurrently with an in-flight
    /// I/O future via `tokio::select!` to race it against cancellation.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Wrap a future with a timeout that cancels with [`CancelReason::Timeout`]
    /// on expiry, per spec §5 ("Timeouts are treated as cancellation with a
    /// specific reason").
    pub async fn with_timeout<F, T>(
        &self,
        duration: std::time::Duration,
        fut: F,
    ) -> Result<T, crate::error::CapabilityError>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            result = fut => Ok(result),
            _ = tokio::time::sleep(duration) => {
                self.cancel(CancelReason::Timeout);
                Err(crate::error::CapabilityError::Timeout(duration))
            }
            _ = self.cancelled() => Err(crate::error::CapabilityError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_cancels_and_errors() {
        let token = CancellationToken::new();
        let result = token
            .with_timeout(std::time::Duration::from_millis(5), async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                42
            })
            .await;
        assert!(result.is_err());
        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(CancelReason::Timeout));
    }

    #[tokio::test]
    async fn fast_future_completes_before_timeout() {
        let token = CancellationToken::new();
        let result = token
            .with_timeout(std::time::Duration::from_secs(5), async { 7 })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert!(!token.is_cancelled());
    }
}
