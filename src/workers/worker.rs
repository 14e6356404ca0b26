//! # Worker loop contract.
//!
//! Every peripheral subsystem (sound, lighting, bell, video) implements [`Worker`]:
//! a named loop that receives the shared [`StopSignal`] and runs until it observes it.
//!
//! ## Contract
//! - Sleep with [`StopSignal::wait`] (or check [`StopSignal::is_set`] between short
//!   operations) so a stop request is noticed within one polling interval.
//! - Return `Ok(())` after observing the stop signal.
//! - Return [`WorkerError::Interrupted`] if the loop itself caught an external interrupt;
//!   the runtime treats it as a clean stop.
//! - Never exit the process.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StopSignal;
use crate::error::WorkerError;

/// # Long-running, cooperatively cancelled peripheral loop.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use displayboard::{StopSignal, Worker, WorkerError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Worker for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
///         while !stop.wait(Duration::from_millis(100)).await {
///             // blink...
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name (used in logs and events).
    fn name(&self) -> &str;

    /// Runs the loop until `stop` is set.
    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError>;
}

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;
