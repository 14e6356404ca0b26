//! # LogWriter: event to `tracing` bridge
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records, so the
//! usual `tracing_subscriber` filter (`--debug`, `--verbose`, `RUST_LOG`) decides what is shown.
//!
//! ## Example output
//! ```text
//! INFO displayboard: worker starting worker="sound"
//! DEBUG displayboard: idle wait timeout_ms=1000
//! INFO displayboard: interrupt received at="foreground"
//! INFO displayboard: shutdown requested
//! DEBUG displayboard: worker joined worker="lighting"
//! WARN displayboard: join timed out, worker detached worker="bell" timeout_ms=2000
//! INFO displayboard: all workers stopped
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let label = e.label.unwrap_or("-");

        match e.kind {
            EventKind::WorkerStarting => {
                tracing::info!(target: "displayboard", worker, "worker starting");
            }
            EventKind::WorkerStopped => {
                tracing::info!(target: "displayboard", worker, "worker stopped");
            }
            EventKind::WorkerFailed => {
                tracing::warn!(target: "displayboard", worker, label, reason, "worker failed");
            }
            EventKind::WorkerInterrupted => {
                tracing::info!(target: "displayboard", worker, "worker interrupted");
            }
            EventKind::ForegroundStarted => {
                tracing::info!(target: "displayboard", worker, "foreground started");
            }
            EventKind::IdleWait => {
                tracing::trace!(target: "displayboard", timeout_ms = ?e.timeout_ms, "idle wait");
            }
            EventKind::InterruptReceived => {
                tracing::info!(target: "displayboard", at = reason, "interrupt received");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "displayboard", "shutdown requested");
            }
            EventKind::WorkerJoined => {
                tracing::debug!(target: "displayboard", worker, "worker joined");
            }
            EventKind::JoinTimedOut => {
                tracing::warn!(
                    target: "displayboard",
                    worker,
                    timeout_ms = ?e.timeout_ms,
                    "join timed out, worker detached"
                );
            }
            EventKind::JoinFault => {
                tracing::debug!(target: "displayboard", worker, label, reason, "join fault ignored");
            }
            EventKind::JoinAbandoned => {
                tracing::warn!(target: "displayboard", worker, "join abandoned after interrupt");
            }
            EventKind::PhaseChanged => {
                tracing::debug!(target: "displayboard", phase = ?e.phase, "phase changed");
            }
            EventKind::AllStopped => {
                tracing::info!(target: "displayboard", "all workers stopped");
            }
            // Logged by the subscriber set itself; never delivered to subscribers.
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {}
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
