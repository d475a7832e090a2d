//! Cooperative cancellation flag.
//!
//! Long-running loops (affiliation batches, guild enumeration during sync-all)
//! check the flag at iteration boundaries and abandon remaining work when it
//! fires, returning the aggregate of completed work with a cancellation
//! indicator.

use std::sync::Arc;

use tokio::sync::watch;

/// Cheaply cloneable cancellation signal shared between a controller and the
/// tasks it spawned.
#[derive(Clone, Debug)]
pub struct CancellationFlag {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationFlag {
    /// Creates a new flag in the not-cancelled state.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals cancellation to every clone of this flag.
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once cancellation is signalled.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if *receiver.borrow() {
            return;
        }

        // The sender lives in self, so changed() can only fail after every
        // clone is dropped, at which point cancellation can never fire.
        while receiver.changed().await.is_ok() {
            if *receiver.borrow() {
                return;
            }
        }
    }
}

impl Default for CancellationFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expect a fresh flag to report not cancelled
    #[test]
    fn starts_not_cancelled() {
        let flag = CancellationFlag::new();
        assert!(!flag.is_cancelled());
    }

    /// Expect cancellation to be visible through clones
    #[test]
    fn propagates_to_clones() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();

        flag.cancel();

        assert!(clone.is_cancelled());
    }

    /// Expect cancelled() to resolve immediately for an already-cancelled flag
    #[tokio::test]
    async fn resolves_for_cancelled_flag() {
        let flag = CancellationFlag::new();
        flag.cancel();

        flag.cancelled().await;
    }

    /// Expect cancelled() to resolve when cancellation fires later
    #[tokio::test]
    async fn resolves_on_later_cancellation() {
        let flag = CancellationFlag::new();
        let waiter = flag.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await });
        flag.cancel();

        handle.await.unwrap();
    }
}
