//! Error types used by the displayboard runtime and worker loops.
//!
//! This module defines two enums:
//!
//! - [`WorkerError`]: returned by a worker loop when it ends other than by observing the stop signal.
//! - [`JoinFault`]: raised while waiting for a background worker during shutdown.
//!
//! Neither type ever reaches the process boundary: the runtime reports them as events and
//! keeps shutting down. Both provide `as_label` for logs.

use thiserror::Error;

/// # Errors returned by a worker loop.
///
/// A loop that simply observes the stop signal returns `Ok(())`.
/// Anything else is one of these.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The loop observed an external interrupt (e.g. Ctrl-C) and stopped early.
    ///
    /// Callers treat this exactly like a normal stop.
    #[error("interrupted")]
    Interrupted,

    /// The loop hit an unrecoverable peripheral fault and gave up.
    #[error("worker fault: {reason}")]
    Fault {
        /// The underlying error message.
        reason: String,
    },
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fault`].
    pub fn fault(reason: impl Into<String>) -> Self {
        WorkerError::Fault {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use displayboard::WorkerError;
    ///
    /// assert_eq!(WorkerError::Interrupted.as_label(), "worker_interrupted");
    /// assert_eq!(WorkerError::fault("gpio busy").as_label(), "worker_fault");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Interrupted => "worker_interrupted",
            WorkerError::Fault { .. } => "worker_fault",
        }
    }

    /// True if the loop ended because of an external interrupt.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, WorkerError::Interrupted)
    }
}

/// # Faults raised while joining a background worker.
///
/// A join fault never aborts shutdown: the supervisor logs it and moves on to the next handle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinFault {
    /// The handle has no way to wait for its worker.
    #[error("handle does not support joining")]
    Unsupported,

    /// The worker panicked; the panic ended only that worker's task.
    #[error("worker panicked: {reason}")]
    Panicked {
        /// Panic payload, if it was a string.
        reason: String,
    },

    /// The handle was already joined or detached.
    #[error("handle already joined")]
    AlreadyJoined,

    /// The wait itself failed for another reason.
    #[error("join failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },
}

impl JoinFault {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            JoinFault::Unsupported => "join_unsupported",
            JoinFault::Panicked { .. } => "join_panicked",
            JoinFault::AlreadyJoined => "join_already_joined",
            JoinFault::Failed { .. } => "join_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(JoinFault::Unsupported.as_label(), "join_unsupported");
        assert_eq!(
            JoinFault::Panicked {
                reason: "boom".into()
            }
            .as_label(),
            "join_panicked"
        );
        assert_eq!(JoinFault::AlreadyJoined.as_label(), "join_already_joined");
    }

    #[test]
    fn fault_message_carries_reason() {
        let err = WorkerError::fault("servo stalled");
        assert_eq!(err.to_string(), "worker fault: servo stalled");
        assert!(!err.is_interrupt());
        assert!(WorkerError::Interrupted.is_interrupt());
    }
}
