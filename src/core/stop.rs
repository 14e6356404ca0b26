//! # StopSignal: the shared, set-once cancellation flag.
//!
//! One [`StopSignal`] is created per coordinator run and cloned into every worker
//! and the foreground runner. Clones share the same flag.
//!
//! ## Rules
//! - `set()` is idempotent; once set the signal stays set.
//! - `is_set()` never blocks.
//! - `wait(timeout)` is the sleep primitive of every worker loop: it returns early
//!   as soon as the signal is set, so cancellation latency is bounded by one slice.
//!
//! Built on [`CancellationToken`], which provides the happens-before edge between
//! `set()` and every observer.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Shared, monotonic, broadcastable stop flag.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use displayboard::StopSignal;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let stop = StopSignal::new();
/// let observer = stop.clone();
///
/// assert!(!observer.wait(Duration::from_millis(5)).await);
/// stop.set();
/// assert!(observer.is_set());
/// assert!(observer.wait(Duration::from_secs(60)).await);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    /// Creates a fresh, unset signal.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Creates a signal that no coordinator holds.
    ///
    /// This is the explicit opt-in for running one worker loop by hand: nothing else
    /// will ever set it, so the loop runs until the caller sets it or the process exits.
    pub fn standalone() -> Self {
        Self::new()
    }

    /// Sets the signal. Idempotent.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Non-blocking read.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits up to `timeout` for the signal.
    ///
    /// Returns `true` if the signal is set when the wait ends.
    pub async fn wait(&self, timeout: Duration) -> bool {
        if self.is_set() {
            return true;
        }
        tokio::time::timeout(timeout, self.token.cancelled())
            .await
            .is_ok()
    }

    /// Waits until the signal is set, without a bound.
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }
}
