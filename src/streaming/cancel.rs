//! Cancellation utilities
//!
//! A first-class cancellation handle for streaming calls. Cancelling is a
//! normal way for a stream to end, not an error.

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// A handle that can be used to request cancellation.
///
/// Clones share one signal: cancelling any clone cancels them all.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    ///
    /// A stream observing this handle stops at its next suspension point,
    /// including while it waits on a stalled server, and releases its
    /// connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub(crate) fn cancelled_owned(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::default()
}
