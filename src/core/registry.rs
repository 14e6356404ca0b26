//! # Worker registry - handles of the running background workers.
//!
//! The registry is filled once during startup (append-only) and consumed by the
//! join phase during shutdown (read-only, in start order).
//!
//! ## Architecture
//! ```text
//! WorkerSupervisor::start_workers()
//!     ├─► tokio::spawn(worker.run(stop)) ──► TaskHandle ──► WorkerRegistry::push
//!     ...
//! WorkerSupervisor::join_workers(registry)
//!     └─► for handle in registry: handle.join(timeout)
//!              ├─ Ok(Finished)  → WorkerJoined
//!              ├─ Ok(TimedOut)  → JoinTimedOut (detached)
//!              └─ Err(fault)    → JoinFault (logged, continue)
//! ```
//!
//! ## Rules
//! - [`WorkerHandle`] is the single join abstraction; any backend (tokio task,
//!   OS thread, child process) can implement it.
//! - A timed-out worker is detached, never aborted.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::JoinFault;
use crate::subscribers::panic_message;

/// Result of a bounded join that did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The worker finished within the bound.
    Finished,
    /// The bound elapsed first; the worker keeps running detached.
    TimedOut,
}

/// Opaque reference to a running background worker.
#[async_trait]
pub trait WorkerHandle: Send {
    /// Human-readable worker name.
    fn name(&self) -> &str;

    /// Waits up to `timeout` for the worker to finish.
    ///
    /// A handle is joined at most once; later calls report [`JoinFault::AlreadyJoined`].
    async fn join(&mut self, timeout: Duration) -> Result<JoinOutcome, JoinFault>;
}

/// [`WorkerHandle`] backed by a tokio task.
pub struct TaskHandle {
    name: String,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Wraps the join handle of a spawned worker task.
    pub fn new(name: impl Into<String>, join: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            join: Some(join),
        }
    }
}

#[async_trait]
impl WorkerHandle for TaskHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn join(&mut self, timeout: Duration) -> Result<JoinOutcome, JoinFault> {
        let mut join = self.join.take().ok_or(JoinFault::AlreadyJoined)?;

        match tokio::time::timeout(timeout, &mut join).await {
            Ok(Ok(())) => Ok(JoinOutcome::Finished),
            Ok(Err(err)) if err.is_panic() => Err(JoinFault::Panicked {
                reason: panic_message(err.into_panic().as_ref()),
            }),
            Ok(Err(err)) => Err(JoinFault::Failed {
                reason: err.to_string(),
            }),
            // Dropping the JoinHandle detaches the task; it is not aborted.
            Err(_elapsed) => Ok(JoinOutcome::TimedOut),
        }
    }
}

/// Ordered list of background worker handles.
#[derive(Default)]
pub struct WorkerRegistry {
    handles: Vec<Box<dyn WorkerHandle>>,
}

impl WorkerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handle.
    pub fn push(&mut self, handle: Box<dyn WorkerHandle>) {
        self.handles.push(handle);
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no worker was started.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Worker names in start order.
    pub fn names(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.name().to_string()).collect()
    }
}

impl IntoIterator for WorkerRegistry {
    type Item = Box<dyn WorkerHandle>;
    type IntoIter = std::vec::IntoIter<Box<dyn WorkerHandle>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("workers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finished_task_joins() {
        let mut h = TaskHandle::new("quick", tokio::spawn(async {}));
        assert_eq!(h.join(Duration::from_secs(1)).await, Ok(JoinOutcome::Finished));
        assert_eq!(h.join(Duration::from_secs(1)).await, Err(JoinFault::AlreadyJoined));
    }

    #[tokio::test]
    async fn stuck_task_times_out() {
        let mut h = TaskHandle::new(
            "stuck",
            tokio::spawn(async { std::future::pending::<()>().await }),
        );
        assert_eq!(h.join(Duration::from_millis(10)).await, Ok(JoinOutcome::TimedOut));
    }

    #[tokio::test]
    async fn panicking_task_reports_panic() {
        let mut h = TaskHandle::new("boom", tokio::spawn(async { panic!("gpio exploded"); }));
        assert_eq!(
            h.join(Duration::from_secs(1)).await,
            Err(JoinFault::Panicked {
                reason: "gpio exploded".into()
            })
        );
    }

    #[tokio::test]
    async fn registry_keeps_start_order() {
        let mut reg = WorkerRegistry::new();
        assert!(reg.is_empty());
        reg.push(Box::new(TaskHandle::new("sound", tokio::spawn(async {}))));
        reg.push(Box::new(TaskHandle::new("bell", tokio::spawn(async {}))));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.names(), vec!["sound".to_string(), "bell".to_string()]);
    }
}
