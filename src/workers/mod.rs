//! # Worker abstractions.
//!
//! - [`Worker`] - trait every peripheral loop implements
//! - [`WorkerFn`] - closure-backed implementation
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)
//! - [`Subsystems`] - the four loops the coordinator dispatches to

mod subsystems;
mod worker;
mod worker_fn;

pub use subsystems::Subsystems;
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
