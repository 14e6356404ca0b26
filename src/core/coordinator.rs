//! # ShutdownCoordinator: one run of the display board, start to clean exit.
//!
//! The coordinator owns the event bus, the subscriber set, the worker supervisor and the
//! foreground runner. [`ShutdownCoordinator::run`] drives the whole lifecycle and always
//! returns exit code `0`.
//!
//! ## High-level architecture
//! ```text
//! build()  ─► stop = StopSignal::new(), interrupt listener attached
//! run(workers: WorkerConfig)
//!   Starting ─► supervisor.start_workers(workers, stop) ─► WorkerRegistry
//!   Running  ─► foreground.run(workers, stop, interrupt)   (blocks; skipped on exit_after_start)
//!   Stopping ─► stop.set(); publish ShutdownRequested
//!               supervisor.join_workers(registry, join_timeout, interrupt)
//!   Stopped  ─► publish AllStopped; flush subscribers (≤ flush_timeout)
//! ```
//!
//! ## State machine
//! ```text
//! Starting ──► Running ──► Stopping ──► Stopped
//!                 │            ▲
//!                 └─ interrupt ┘
//! ```
//! Transitions are one-directional; there is no resume.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::{Config, WorkerConfig};
use crate::core::foreground::ForegroundRunner;
use crate::core::shutdown::{Interrupt, InterruptListener};
use crate::core::supervisor::WorkerSupervisor;
use crate::core::StopSignal;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::Subsystems;

/// Exit code of every run that goes through the coordinator.
pub const EXIT_SUCCESS: i32 = 0;

/// Lifecycle phase of a coordinator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Building the stop signal and spawning background workers.
    Starting = 0,
    /// Workers live; the foreground is blocking.
    Running = 1,
    /// Stop signal set; joining workers.
    Stopping = 2,
    /// Terminal.
    Stopped = 3,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Phase::Starting,
            1 => Phase::Running,
            2 => Phase::Stopping,
            _ => Phase::Stopped,
        }
    }
}

/// Read-only view of a coordinator's current phase.
///
/// Cheap to clone; stays valid after the coordinator is consumed by `run`.
#[derive(Clone, Debug)]
pub struct PhaseHandle {
    cell: Arc<AtomicU8>,
}

impl PhaseHandle {
    fn new() -> Self {
        Self {
            cell: Arc::new(AtomicU8::new(Phase::Starting as u8)),
        }
    }

    /// Current phase.
    pub fn get(&self) -> Phase {
        Phase::from_u8(self.cell.load(Ordering::Acquire))
    }

    /// Moves forward to `next`; never moves backwards.
    fn advance(&self, next: Phase) -> bool {
        let prev = self.cell.fetch_max(next as u8, Ordering::AcqRel);
        prev < next as u8
    }
}

/// Orchestrates start, foreground, stop and join for one run.
pub struct ShutdownCoordinator {
    cfg: Config,
    bus: Bus,
    subs: SubscriberSet,
    supervisor: WorkerSupervisor,
    foreground: ForegroundRunner,
    interrupt: Interrupt,
    listener: InterruptListener,
    stop: StopSignal,
    phase: PhaseHandle,
}

impl ShutdownCoordinator {
    /// Returns a builder; see [`CoordinatorBuilder`].
    pub fn builder(cfg: Config) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    /// The event bus; subscribe before calling [`run`](Self::run) to observe the whole run.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The interrupt latch this coordinator listens to.
    ///
    /// Raises after [`CoordinatorBuilder::build`] are observed by [`run`](Self::run).
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// The run's stop signal.
    ///
    /// Setting it ends the foreground phase the same way an interrupt does, minus the
    /// interrupt event.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Handle for reading the lifecycle phase from elsewhere.
    pub fn phase(&self) -> PhaseHandle {
        self.phase.clone()
    }

    /// Runs the display board until the foreground finishes or an interrupt arrives,
    /// then shuts every worker down.
    ///
    /// Returns [`EXIT_SUCCESS`] on every path.
    pub async fn run(self, workers: WorkerConfig) -> i32 {
        let ShutdownCoordinator {
            cfg,
            bus,
            subs,
            supervisor,
            foreground,
            listener: mut interrupt,
            stop,
            phase,
            ..
        } = self;
        let enter = |next: Phase| {
            phase.advance(next);
            bus.publish(Event::new(EventKind::PhaseChanged).with_phase(next));
        };

        let listener = spawn_subscriber_listener(&bus, subs);

        enter(Phase::Starting);
        let registry = supervisor.start_workers(&workers, &stop);

        enter(Phase::Running);
        if !workers.exit_after_start {
            foreground.run(&workers, &stop, &mut interrupt).await;
        }

        enter(Phase::Stopping);
        stop.set();
        bus.publish(Event::new(EventKind::ShutdownRequested));
        supervisor
            .join_workers(registry, cfg.join_timeout, &mut interrupt)
            .await;

        enter(Phase::Stopped);
        bus.publish(Event::new(EventKind::AllStopped));
        let _ = tokio::time::timeout(cfg.flush_timeout, listener).await;

        EXIT_SUCCESS
    }
}

/// Forwards bus events to the subscriber set until the run's last event.
///
/// Subscriber delivery reports are not fed back into the set.
fn spawn_subscriber_listener(bus: &Bus, set: SubscriberSet) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.is_subscriber_event() => continue,
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.kind == EventKind::AllStopped {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}

/// Builder for constructing a [`ShutdownCoordinator`].
pub struct CoordinatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    interrupt: Option<Interrupt>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            interrupt: None,
        }
    }

    /// Sets event subscribers (logging, metrics, ...).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the interrupt latch; defaults to a latch only raised programmatically.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Builds the coordinator for `subsystems`.
    ///
    /// Must be called inside a tokio runtime (subscriber workers are spawned here).
    pub fn build(self, subsystems: Subsystems) -> ShutdownCoordinator {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let foreground = ForegroundRunner::new(
            bus.clone(),
            subsystems.video.clone(),
            self.cfg.idle_interval,
            self.cfg.foreground_grace,
        );
        let supervisor = WorkerSupervisor::new(bus.clone(), subsystems);
        let interrupt = self.interrupt.unwrap_or_default();
        let listener = interrupt.listen();

        ShutdownCoordinator {
            cfg: self.cfg,
            bus,
            subs,
            supervisor,
            foreground,
            interrupt,
            listener,
            stop: StopSignal::new(),
            phase: PhaseHandle::new(),
        }
    }
}
