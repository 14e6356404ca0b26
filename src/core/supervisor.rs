//! # WorkerSupervisor: starts background workers and joins them at shutdown.
//!
//! ## Start
//! ```text
//! start_workers(config, stop)
//!   for (flag, worker) in [(sounds, sound), (lighting, lighting), (bell, bell)]:
//!       flag off → skip
//!       flag on  → publish WorkerStarting
//!                  tokio::spawn(run_isolated(worker, stop.clone()))
//!                  registry.push(TaskHandle)
//! ```
//!
//! ## Join
//! ```text
//! join_workers(registry, timeout, interrupt)
//!   for handle in registry (start order):
//!       select {
//!           handle.join(timeout) ─► WorkerJoined | JoinTimedOut | JoinFault
//!           interrupt.recv()     ─► InterruptReceived, JoinAbandoned for the rest; stop
//!       }
//! ```
//!
//! ## Rules
//! - Start order is fixed (sound, lighting, bell) for deterministic logs.
//! - Each worker task is isolated: a fault or panic ends only that task.
//! - `join_workers` never fails and never blocks longer than `timeout` per handle.

use std::time::Duration;

use crate::config::WorkerConfig;
use crate::core::registry::{JoinOutcome, TaskHandle, WorkerHandle, WorkerRegistry};
use crate::core::shutdown::InterruptListener;
use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::workers::{Subsystems, WorkerRef};

/// Starts and joins the background peripheral workers.
pub struct WorkerSupervisor {
    bus: Bus,
    subsystems: Subsystems,
}

impl WorkerSupervisor {
    /// Creates a supervisor publishing to `bus`.
    pub fn new(bus: Bus, subsystems: Subsystems) -> Self {
        Self { bus, subsystems }
    }

    /// Spawns one task per enabled background subsystem, in order sound, lighting, bell.
    ///
    /// Video is never started here; it belongs to the foreground runner.
    pub fn start_workers(&self, config: &WorkerConfig, stop: &StopSignal) -> WorkerRegistry {
        let mut registry = WorkerRegistry::new();
        let background = [
            (config.sounds_enabled, &self.subsystems.sound),
            (config.lighting_enabled, &self.subsystems.lighting),
            (config.bell_enabled, &self.subsystems.bell),
        ];

        for (enabled, worker) in background {
            if enabled {
                registry.push(Box::new(self.spawn(worker, stop)));
            }
        }
        registry
    }

    /// Joins every handle in registry order, each bounded by `timeout_per_worker`.
    ///
    /// Join faults are reported and skipped. An interrupt during this phase abandons
    /// the remaining joins.
    pub async fn join_workers(
        &self,
        registry: WorkerRegistry,
        timeout_per_worker: Duration,
        interrupt: &mut InterruptListener,
    ) {
        let mut handles = registry.into_iter();

        while let Some(mut handle) = handles.next() {
            let name = handle.name().to_string();
            tokio::select! {
                biased;
                _ = interrupt.recv() => {
                    self.bus.publish(Event::new(EventKind::InterruptReceived).with_reason("join"));
                    self.publish_abandoned(&name);
                    for rest in handles.by_ref() {
                        self.publish_abandoned(rest.name());
                    }
                    break;
                }
                res = handle.join(timeout_per_worker) => {
                    self.report_join(&name, timeout_per_worker, res);
                }
            }
        }
    }

    fn spawn(&self, worker: &WorkerRef, stop: &StopSignal) -> TaskHandle {
        let name = worker.name().to_string();
        self.bus
            .publish(Event::new(EventKind::WorkerStarting).with_worker(name.as_str()));

        let task = run_isolated(worker.clone(), stop.clone(), self.bus.clone());
        TaskHandle::new(name, tokio::spawn(task))
    }

    fn report_join(
        &self,
        name: &str,
        timeout: Duration,
        res: Result<JoinOutcome, crate::error::JoinFault>,
    ) {
        let ev = match res {
            Ok(JoinOutcome::Finished) => Event::new(EventKind::WorkerJoined).with_worker(name),
            Ok(JoinOutcome::TimedOut) => Event::new(EventKind::JoinTimedOut)
                .with_worker(name)
                .with_timeout(timeout),
            Err(fault) => Event::new(EventKind::JoinFault)
                .with_worker(name)
                .with_label(fault.as_label())
                .with_reason(fault.to_string()),
        };
        self.bus.publish(ev);
    }

    fn publish_abandoned(&self, name: &str) {
        self.bus
            .publish(Event::new(EventKind::JoinAbandoned).with_worker(name));
    }
}

/// Runs one worker loop to completion and publishes its terminal event.
///
/// Always publishes **exactly one** of `WorkerStopped`, `WorkerInterrupted`, `WorkerFailed`
/// unless the loop panics, in which case the panic surfaces at join time.
pub(crate) async fn run_isolated(worker: WorkerRef, stop: StopSignal, bus: Bus) {
    let res = worker.run(stop).await;
    bus.publish(terminal_event(worker.name(), res));
}

/// Maps a loop result to its terminal event.
pub(crate) fn terminal_event(name: &str, res: Result<(), WorkerError>) -> Event {
    match res {
        Ok(()) => Event::new(EventKind::WorkerStopped).with_worker(name),
        Err(e @ WorkerError::Interrupted) => Event::new(EventKind::WorkerInterrupted)
            .with_worker(name)
            .with_label(e.as_label()),
        Err(e) => Event::new(EventKind::WorkerFailed)
            .with_worker(name)
            .with_label(e.as_label())
            .with_reason(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shutdown::Interrupt;
    use crate::error::JoinFault;
    use crate::workers::WorkerFn;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn until_stopped(name: &'static str, runs: Arc<AtomicUsize>) -> WorkerRef {
        WorkerFn::arc(name, move |stop: StopSignal| {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                stop.stopped().await;
                Ok::<(), WorkerError>(())
            }
        })
    }

    fn subsystems(runs: &Arc<AtomicUsize>) -> Subsystems {
        Subsystems::new(
            until_stopped("sound", runs.clone()),
            until_stopped("lighting", runs.clone()),
            until_stopped("bell", runs.clone()),
            until_stopped("video", runs.clone()),
        )
    }

    async fn hang(_stop: StopSignal) -> Result<(), WorkerError> {
        std::future::pending().await
    }

    async fn explode(_stop: StopSignal) -> Result<(), WorkerError> {
        panic!("strip unplugged")
    }

    async fn stall(_stop: StopSignal) -> Result<(), WorkerError> {
        Err(WorkerError::fault("servo stalled"))
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn registry_length_matches_enabled_background_workers() {
        for mask in 0..8u8 {
            let runs = Arc::new(AtomicUsize::new(0));
            let sup = WorkerSupervisor::new(Bus::new(64), subsystems(&runs));
            let config = WorkerConfig {
                sounds_enabled: mask & 1 != 0,
                lighting_enabled: mask & 2 != 0,
                bell_enabled: mask & 4 != 0,
                video_enabled: true,
                exit_after_start: false,
            };
            let stop = StopSignal::new();

            let registry = sup.start_workers(&config, &stop);
            assert_eq!(registry.len(), config.background_count(), "mask {mask:03b}");
            assert!(!registry.names().iter().any(|n| n == "video"));

            stop.set();
            let interrupt = Interrupt::new();
            sup.join_workers(registry, Duration::from_secs(1), &mut interrupt.listen())
                .await;
            assert_eq!(runs.load(Ordering::SeqCst), config.background_count());
        }
    }

    #[tokio::test]
    async fn workers_start_in_fixed_order() {
        let runs = Arc::new(AtomicUsize::new(0));
        let sup = WorkerSupervisor::new(Bus::new(64), subsystems(&runs));
        let registry = sup.start_workers(&WorkerConfig::default(), &StopSignal::new());
        assert_eq!(registry.names(), vec!["sound", "lighting", "bell"]);
    }

    struct NoJoin;

    #[async_trait]
    impl WorkerHandle for NoJoin {
        fn name(&self) -> &str {
            "no-join"
        }

        async fn join(&mut self, _timeout: Duration) -> Result<JoinOutcome, JoinFault> {
            Err(JoinFault::Unsupported)
        }
    }

    struct BadJoin;

    #[async_trait]
    impl WorkerHandle for BadJoin {
        fn name(&self) -> &str {
            "bad-join"
        }

        async fn join(&mut self, _timeout: Duration) -> Result<JoinOutcome, JoinFault> {
            Err(JoinFault::Failed {
                reason: "fail".into(),
            })
        }
    }

    #[tokio::test]
    async fn faulty_handles_do_not_abort_the_join() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let runs = Arc::new(AtomicUsize::new(0));
        let sup = WorkerSupervisor::new(bus, subsystems(&runs));

        let mut registry = WorkerRegistry::new();
        registry.push(Box::new(NoJoin));
        registry.push(Box::new(BadJoin));
        registry.push(Box::new(TaskHandle::new("good", tokio::spawn(async {}))));

        let interrupt = Interrupt::new();
        sup.join_workers(registry, Duration::from_secs(1), &mut interrupt.listen())
            .await;

        let events = drain(&mut rx);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::JoinFault, EventKind::JoinFault, EventKind::WorkerJoined]
        );
        let labels: Vec<_> = events.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![Some("join_unsupported"), Some("join_failed"), None]);
    }

    #[tokio::test]
    async fn worker_ignoring_stop_times_out_and_join_continues() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let runs = Arc::new(AtomicUsize::new(0));
        let stubborn: WorkerRef = WorkerFn::arc("sound", hang);
        let subs = Subsystems::new(
            stubborn,
            until_stopped("lighting", runs.clone()),
            until_stopped("bell", runs.clone()),
            until_stopped("video", runs.clone()),
        );
        let sup = WorkerSupervisor::new(bus, subs);
        let stop = StopSignal::new();
        let registry = sup.start_workers(&WorkerConfig::default(), &stop);

        stop.set();
        let interrupt = Interrupt::new();
        sup.join_workers(registry, Duration::from_millis(50), &mut interrupt.listen())
            .await;

        let joins: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e.kind, EventKind::WorkerJoined | EventKind::JoinTimedOut))
            .map(|e| (e.kind, e.worker.as_deref().map(str::to_string)))
            .collect();
        assert_eq!(joins[0], (EventKind::JoinTimedOut, Some("sound".to_string())));
        assert_eq!(joins.len(), 3);
    }

    #[tokio::test]
    async fn interrupt_during_join_abandons_the_rest() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let stubborn = |name: &'static str| -> WorkerRef { WorkerFn::arc(name, hang) };
        let subs = Subsystems::new(
            stubborn("sound"),
            stubborn("lighting"),
            stubborn("bell"),
            stubborn("video"),
        );
        let sup = WorkerSupervisor::new(bus, subs);
        let registry = sup.start_workers(&WorkerConfig::default(), &StopSignal::new());

        let interrupt = Interrupt::new();
        let mut listener = interrupt.listen();
        let raiser = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            raiser.raise();
        });
        sup.join_workers(registry, Duration::from_secs(30), &mut listener)
            .await;

        let abandoned = drain(&mut rx)
            .into_iter()
            .filter(|e| e.kind == EventKind::JoinAbandoned)
            .count();
        assert_eq!(abandoned, 3);
    }

    #[tokio::test]
    async fn faulting_worker_is_isolated() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let runs = Arc::new(AtomicUsize::new(0));
        let broken: WorkerRef = WorkerFn::arc("bell", stall);
        let panicky: WorkerRef = WorkerFn::arc("lighting", explode);
        let subs = Subsystems::new(
            until_stopped("sound", runs.clone()),
            panicky,
            broken,
            until_stopped("video", runs.clone()),
        );
        let sup = WorkerSupervisor::new(bus, subs);
        let stop = StopSignal::new();
        let registry = sup.start_workers(&WorkerConfig::default(), &stop);

        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.set();
        let interrupt = Interrupt::new();
        sup.join_workers(registry, Duration::from_secs(1), &mut interrupt.listen())
            .await;

        let events = drain(&mut rx);
        let failed = events
            .iter()
            .find(|e| e.kind == EventKind::WorkerFailed)
            .expect("bell failure reported");
        assert_eq!(failed.worker.as_deref(), Some("bell"));
        assert_eq!(failed.label, Some("worker_fault"));
        let fault = events
            .iter()
            .find(|e| e.kind == EventKind::JoinFault)
            .expect("lighting panic reported at join");
        assert_eq!(fault.worker.as_deref(), Some("lighting"));
        assert_eq!(fault.label, Some("join_panicked"));
        assert!(events
            .iter()
            .any(|e| e.kind == EventKind::WorkerJoined && e.worker.as_deref() == Some("sound")));
    }
}
