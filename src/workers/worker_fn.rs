//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(StopSignal) -> Fut`, producing a fresh
//! future per run. Shared state, if any, goes in an `Arc` captured by the closure.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use displayboard::{StopSignal, Worker, WorkerError, WorkerFn, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc("ticker", |stop: StopSignal| async move {
//!     while !stop.wait(Duration::from_millis(50)).await {}
//!     Ok::<_, WorkerError>(())
//! });
//!
//! assert_eq!(w.name(), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::workers::Worker;

/// Function-backed worker implementation.
#[derive(Debug)]
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`](crate::WorkerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(StopSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
        (self.f)(stop).await
    }
}
