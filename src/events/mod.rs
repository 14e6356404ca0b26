//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the coordinator, the worker
//! supervisor, the foreground runner and the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ShutdownCoordinator`, `WorkerSupervisor` and its spawned
//!   worker tasks, `ForegroundRunner`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the coordinator's subscriber listener (fans out to
//!   `SubscriberSet`) and any receiver obtained via [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
