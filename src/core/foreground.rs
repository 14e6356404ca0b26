//! # ForegroundRunner: the blocking "are we done" gate.
//!
//! ## Flow
//! ```text
//! run(config, stop, interrupt)
//!   ├─ video enabled:
//!   │     select {
//!   │         video.run(stop)  ─► WorkerStopped | WorkerInterrupted | WorkerFailed
//!   │         interrupt.recv() ─► InterruptReceived
//!   │                             stop.set()
//!   │                             wait ≤ foreground_grace for video to return
//!   │     }
//!   └─ video disabled:
//!         loop {
//!             publish IdleWait
//!             select {
//!                 stop.wait(idle_interval) ─► true → break
//!                 interrupt.recv()         ─► InterruptReceived, break
//!             }
//!         }
//! ```
//!
//! ## Rules
//! - Never fails; panics inside the video loop are caught and reported.
//! - Interrupts raised before `run` returns belong to the foreground: anything still
//!   pending on the listener is marked seen, so only later raises reach the join phase.
//! - The video loop runs inline on the coordinator's flow, never as a spawned task.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;

use crate::config::WorkerConfig;
use crate::core::shutdown::InterruptListener;
use crate::core::supervisor::terminal_event;
use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;
use crate::workers::WorkerRef;

/// Runs the video loop or the idle wait until the run is over.
pub struct ForegroundRunner {
    bus: Bus,
    video: WorkerRef,
    idle_interval: Duration,
    grace: Duration,
}

impl ForegroundRunner {
    /// Creates a runner for `video`.
    ///
    /// `idle_interval` is the idle wait slice, `grace` the wind-down window after an interrupt.
    pub fn new(bus: Bus, video: WorkerRef, idle_interval: Duration, grace: Duration) -> Self {
        Self {
            bus,
            video,
            idle_interval,
            grace,
        }
    }

    /// Blocks until the stop signal fires, the video loop returns, or an interrupt arrives.
    pub async fn run(
        &self,
        config: &WorkerConfig,
        stop: &StopSignal,
        interrupt: &mut InterruptListener,
    ) {
        if config.video_enabled {
            self.run_video(stop, interrupt).await;
        } else {
            self.run_idle(stop, interrupt).await;
        }
        interrupt.mark_seen();
    }

    async fn run_video(&self, stop: &StopSignal, interrupt: &mut InterruptListener) {
        let name = self.video.name().to_string();
        self.bus
            .publish(Event::new(EventKind::ForegroundStarted).with_worker(name.as_str()));

        let video = AssertUnwindSafe(self.video.run(stop.clone())).catch_unwind();
        tokio::pin!(video);

        let res = tokio::select! {
            biased;
            res = &mut video => res,
            _ = interrupt.recv() => {
                self.publish_interrupt();
                stop.set();
                match tokio::time::timeout(self.grace, &mut video).await {
                    Ok(res) => res,
                    Err(_elapsed) => {
                        // Dropping the future ends the loop; its resources clean up on drop.
                        self.bus.publish(
                            Event::new(EventKind::WorkerFailed)
                                .with_worker(name.as_str())
                                .with_reason("did not stop within grace")
                                .with_timeout(self.grace),
                        );
                        return;
                    }
                }
            }
        };

        match res {
            Ok(Err(WorkerError::Interrupted)) => {
                self.publish_interrupt();
                self.bus.publish(terminal_event(&name, Err(WorkerError::Interrupted)));
            }
            Ok(res) => self.bus.publish(terminal_event(&name, res)),
            Err(panic) => self.bus.publish(
                Event::new(EventKind::WorkerFailed)
                    .with_worker(name.as_str())
                    .with_reason(format!("panicked: {}", panic_message(panic.as_ref()))),
            ),
        }
    }

    async fn run_idle(&self, stop: &StopSignal, interrupt: &mut InterruptListener) {
        self.bus.publish(Event::new(EventKind::ForegroundStarted));

        loop {
            self.bus
                .publish(Event::new(EventKind::IdleWait).with_timeout(self.idle_interval));
            tokio::select! {
                biased;
                _ = interrupt.recv() => {
                    self.publish_interrupt();
                    break;
                }
                set = stop.wait(self.idle_interval) => {
                    if set {
                        break;
                    }
                }
            }
        }
    }

    fn publish_interrupt(&self) {
        self.bus
            .publish(Event::new(EventKind::InterruptReceived).with_reason("foreground"));
    }
}
