//! Runtime core: stop signal, interrupts and the shutdown sequence.
//!
//! The public entry point is [`ShutdownCoordinator`]; the rest is exposed so the
//! pieces can be driven and tested on their own.
//!
//! Internal modules:
//! - [`stop`]: the shared cooperative stop flag;
//! - [`shutdown`]: the external interrupt latch and OS signal wiring;
//! - [`registry`]: handles of running background workers and bounded joins;
//! - [`supervisor`]: starts background workers and joins them in order;
//! - [`foreground`]: video loop or idle wait on the coordinator's own flow;
//! - [`coordinator`]: the start, run, stop, join sequence.

mod coordinator;
mod foreground;
mod registry;
mod shutdown;
mod stop;
mod supervisor;

pub use coordinator::{CoordinatorBuilder, Phase, PhaseHandle, ShutdownCoordinator, EXIT_SUCCESS};
pub use foreground::ForegroundRunner;
pub use registry::{JoinOutcome, TaskHandle, WorkerHandle, WorkerRegistry};
pub use shutdown::{Interrupt, InterruptListener};
pub use stop::StopSignal;
pub use supervisor::WorkerSupervisor;
