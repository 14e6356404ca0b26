//! # Runtime events emitted by the coordinator, supervisor and workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Worker events**: background/foreground loop lifecycle (starting, stopped, failed)
//! - **Foreground events**: idle waits and interrupts on the primary flow
//! - **Shutdown events**: stop requested, per-worker join outcomes, completion
//! - **Subscriber events**: delivery problems inside the subscriber set
//!
//! The [`Event`] struct carries additional metadata such as timestamps, worker name,
//! reasons and timeouts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use displayboard::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JoinTimedOut)
//!     .with_worker("bell")
//!     .with_timeout(Duration::from_secs(2));
//!
//! assert_eq!(ev.kind, EventKind::JoinTimedOut);
//! assert_eq!(ev.worker.as_deref(), Some("bell"));
//! assert_eq!(ev.timeout_ms, Some(2000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::Phase;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Worker lifecycle events ===
    /// A background worker task was spawned.
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerStarting,

    /// A worker loop returned after observing the stop signal.
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerStopped,

    /// A worker loop returned a fault or panicked.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: failure message
    WorkerFailed,

    /// A worker loop stopped because it observed an external interrupt.
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerInterrupted,

    // === Foreground events ===
    /// The foreground phase began.
    ///
    /// Sets:
    /// - `worker`: video worker name, or `None` for the idle wait
    ForegroundStarted,

    /// The idle foreground entered one wait slice.
    ///
    /// Sets:
    /// - `timeout_ms`: length of the slice
    IdleWait,

    /// An external interrupt was observed at a blocking point.
    ///
    /// Sets:
    /// - `reason`: where it was observed ("foreground", "join")
    InterruptReceived,

    // === Shutdown events ===
    /// The stop signal was set; the join phase follows.
    ShutdownRequested,

    /// A background worker finished within its join bound.
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerJoined,

    /// A background worker did not finish within its join bound and was detached.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `timeout_ms`: the join bound
    JoinTimedOut,

    /// Waiting for a background worker faulted; the join moved on.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: fault message
    JoinFault,

    /// A join was skipped because an interrupt arrived during the join phase.
    ///
    /// Sets:
    /// - `worker`: worker name
    JoinAbandoned,

    /// The coordinator moved to a new lifecycle phase.
    ///
    /// Sets:
    /// - `phase`: the new phase
    PhaseChanged,

    /// Shutdown completed; last event of a run.
    AllStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the worker (or subscriber), if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Timeout or wait slice in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Lifecycle phase, for [`EventKind::PhaseChanged`].
    pub phase: Option<Phase>,
    /// Stable snake_case error label (`WorkerError::as_label`, `JoinFault::as_label`).
    pub label: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            timeout_ms: None,
            phase: None,
            label: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a lifecycle phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a stable error label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    /// True for events that report a subscriber delivery problem.
    ///
    /// These are never fed back into the subscriber set.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
