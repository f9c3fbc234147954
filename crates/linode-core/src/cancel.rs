//! Cooperative cancellation for in-flight requests.

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation signal.
///
/// Every clone observes the same state; cancelling any clone cancels them all.
/// Cancellation is permanent.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Cancel the token, waking every pending [`CancellationToken::cancelled`].
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Returns true once [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
