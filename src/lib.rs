//! # displayboard
//!
//! **displayboard** runs the peripherals of a haunted display board (sound, LED
//! lighting, a servo bell and a looping video) as concurrent workers, and shuts them
//! all down cooperatively on request.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!       │  SoundLoop   │   │ LightingLoop │   │   BellLoop   │   │  VideoLoop   │
//!       │ (background) │   │ (background) │   │ (background) │   │ (foreground) │
//!       └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!              ▼                  ▼                  ▼                  ▼
//! ┌──────────────────────────────────────────────────────────────────────────────┐
//! │  ShutdownCoordinator                                                         │
//! │  - StopSignal (one per run, cloned into every worker)                        │
//! │  - Interrupt (OS signals / programmatic raises)                              │
//! │  - WorkerSupervisor (spawns background workers, bounded joins)               │
//! │  - ForegroundRunner (video inline, or idle wait)                             │
//! └──────┬───────────────────────────────────────────────────────────────────────┘
//!        │ publishes Events: WorkerStarting, WorkerStopped, IdleWait,
//!        │ ShutdownRequested, WorkerJoined, JoinTimedOut, PhaseChanged, ...
//!        ▼
//! ┌──────────────────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                               │
//! └─────────────────────────────────┬────────────────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                      LogWriter  sub2     subN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Starting  ─► start_workers(config, stop)      sound, lighting, bell (if enabled)
//! Running   ─► foreground.run(config, stop)     video loop inline, or idle wait
//!              (returns on stop, video exit, or an external interrupt)
//! Stopping  ─► stop.set()
//!              join_workers(registry, join_timeout)
//! Stopped   ─► AllStopped, subscribers flushed, exit code 0
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                          |
//! |-------------------|------------------------------------------------------------|---------------------------------------------|
//! | **Stop signal**   | Shared set-once cancellation flag with a stop-aware sleep. | [`StopSignal`]                              |
//! | **Workers**       | The loop contract every peripheral implements.             | [`Worker`], [`WorkerFn`], [`WorkerRef`]     |
//! | **Coordination**  | Start, foreground, stop and join for one run.              | [`ShutdownCoordinator`], [`Phase`]          |
//! | **Interrupts**    | OS signals and programmatic stop requests.                 | [`Interrupt`]                               |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics).             | [`Subscribe`]                               |
//! | **Errors**        | Typed errors for loops and joins.                          | [`WorkerError`], [`JoinFault`]              |
//! | **Peripherals**   | Reference sound, lighting, bell and video loops.           | [`peripherals`]                             |
//! | **Configuration** | Runtime tuning and enabled subsystems.                     | [`Config`], [`WorkerConfig`], [`Cli`]       |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber that forwards
//!   events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use displayboard::{
//!     Config, ShutdownCoordinator, StopSignal, Subsystems, WorkerConfig, WorkerError, WorkerFn,
//!     WorkerRef,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let idle = |name: &'static str| -> WorkerRef {
//!         WorkerFn::arc(name, |stop: StopSignal| async move {
//!             stop.stopped().await;
//!             Ok::<_, WorkerError>(())
//!         })
//!     };
//!     let subsystems = Subsystems::new(idle("sound"), idle("lighting"), idle("bell"), idle("video"));
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn displayboard::Subscribe>> = vec![Arc::new(displayboard::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn displayboard::Subscribe>> = Vec::new();
//!
//!     let coordinator = ShutdownCoordinator::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build(subsystems);
//!
//!     // Start the background workers, then shut straight down.
//!     let workers = WorkerConfig { exit_after_start: true, ..WorkerConfig::default() };
//!     assert_eq!(coordinator.run(workers).await, 0);
//! }
//! ```

mod cli;
mod config;
mod core;
mod error;
mod events;
pub mod peripherals;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use cli::Cli;
pub use config::{Config, WorkerConfig};
pub use crate::core::{
    CoordinatorBuilder, ForegroundRunner, Interrupt, InterruptListener, JoinOutcome, Phase,
    PhaseHandle, ShutdownCoordinator, StopSignal, TaskHandle, WorkerHandle, WorkerRegistry,
    WorkerSupervisor, EXIT_SUCCESS,
};
pub use error::{JoinFault, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use workers::{Subsystems, Worker, WorkerFn, WorkerRef};

// Optional: expose the built-in logger subscriber.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
