//! # Bell: servo-swung bell with a matching scream.
//!
//! Waits a random pause, then usually rings: plays the bell clip from a random
//! offset and swings the servo a few times. Every wait, pauses between swings
//! included, is a stop-aware [`StopSignal::wait`].

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{random_duration, random_f32};
use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::workers::Worker;

/// Output side of the bell: one servo plus its sound clip.
pub trait BellActuator: Send + Sync + 'static {
    /// Starts the bell clip `offset` into the file.
    fn ring(&self, volume: f32, offset: Duration) -> Result<(), WorkerError>;
    /// Moves the servo to `position` in `[-1, 1]`.
    fn swing_to(&self, position: f32) -> Result<(), WorkerError>;
    /// Centres the servo and releases it.
    fn rest(&self) -> Result<(), WorkerError>;
}

/// Actuator that logs instead of driving a servo.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBell;

impl BellActuator for TracingBell {
    fn ring(&self, volume: f32, offset: Duration) -> Result<(), WorkerError> {
        tracing::debug!(target: "displayboard::bell", volume, offset_s = offset.as_secs(), "ring");
        Ok(())
    }

    fn swing_to(&self, position: f32) -> Result<(), WorkerError> {
        tracing::trace!(target: "displayboard::bell", position, "swing");
        Ok(())
    }

    fn rest(&self) -> Result<(), WorkerError> {
        tracing::trace!(target: "displayboard::bell", "rest");
        Ok(())
    }
}

/// Bell timing and swing tuning. Ranges are inclusive `(min, max)` pairs.
#[derive(Debug, Clone)]
pub struct BellConfig {
    /// Pause before each ring attempt.
    pub pause: (Duration, Duration),
    /// Chance that an attempt actually rings.
    pub trigger_probability: f64,
    /// Clip volume.
    pub volume: (f32, f32),
    /// Clip offset range, in whole seconds.
    pub offset_secs: (u64, u64),
    /// Servo swings per ring.
    pub swings: (u32, u32),
    /// Servo target position per swing, within `[-1, 1]`.
    pub swing_position: (f32, f32),
    /// Pause after each swing.
    pub swing_pause: (Duration, Duration),
}

impl Default for BellConfig {
    fn default() -> Self {
        Self {
            pause: (Duration::from_secs(10), Duration::from_secs(40)),
            trigger_probability: 0.8,
            volume: (0.3, 1.0),
            offset_secs: (0, 90),
            swings: (1, 5),
            swing_position: (-1.0, 1.0),
            swing_pause: (Duration::from_millis(300), Duration::from_millis(600)),
        }
    }
}

/// Background bell loop.
pub struct BellLoop<A> {
    cfg: BellConfig,
    bell: A,
}

impl<A: BellActuator> BellLoop<A> {
    /// Creates the loop driving `bell`.
    pub fn new(cfg: BellConfig, bell: A) -> Self {
        Self { cfg, bell }
    }

    /// One ring. Returns `Ok(true)` if stop was observed mid-swing.
    async fn ring_once(&self, stop: &StopSignal, rng: &mut StdRng) -> Result<bool, WorkerError> {
        let cfg = &self.cfg;
        let volume = random_f32(rng, cfg.volume.0, cfg.volume.1);
        let offset = rng.random_range(cfg.offset_secs.0..=cfg.offset_secs.1.max(cfg.offset_secs.0));
        self.bell.ring(volume, Duration::from_secs(offset))?;

        let swings = rng.random_range(cfg.swings.0..=cfg.swings.1.max(cfg.swings.0));
        for _ in 0..swings {
            let pos = random_f32(rng, cfg.swing_position.0, cfg.swing_position.1);
            self.bell.swing_to(pos)?;
            if stop.wait(random_duration(rng, cfg.swing_pause.0, cfg.swing_pause.1)).await {
                return Ok(true);
            }
        }
        self.bell.rest()?;
        Ok(false)
    }
}

#[async_trait]
impl<A: BellActuator> Worker for BellLoop<A> {
    fn name(&self) -> &str {
        "bell"
    }

    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
        let mut rng = StdRng::from_os_rng();
        let p = self.cfg.trigger_probability.clamp(0.0, 1.0);

        let res = loop {
            let pause = random_duration(&mut rng, self.cfg.pause.0, self.cfg.pause.1);
            if stop.wait(pause).await {
                break Ok(());
            }
            if !rng.random_bool(p) {
                continue;
            }
            match self.ring_once(&stop, &mut rng).await {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = self.bell.rest() {
            tracing::warn!(target: "displayboard::bell", error = %e, "failed to rest servo");
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        rings: Arc<Mutex<Vec<f32>>>,
        swings: Arc<Mutex<Vec<f32>>>,
        rests: Arc<Mutex<usize>>,
    }

    impl BellActuator for Recorder {
        fn ring(&self, volume: f32, _offset: Duration) -> Result<(), WorkerError> {
            self.rings.lock().unwrap().push(volume);
            Ok(())
        }
        fn swing_to(&self, position: f32) -> Result<(), WorkerError> {
            self.swings.lock().unwrap().push(position);
            Ok(())
        }
        fn rest(&self) -> Result<(), WorkerError> {
            *self.rests.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn eager() -> BellConfig {
        BellConfig {
            pause: (Duration::from_millis(5), Duration::from_millis(10)),
            trigger_probability: 1.0,
            swing_pause: (Duration::from_millis(1), Duration::from_millis(2)),
            ..BellConfig::default()
        }
    }

    #[tokio::test]
    async fn rings_with_swings_in_range() {
        let rec = Recorder::default();
        let bell = BellLoop::new(eager(), rec.clone());
        let stop = StopSignal::new();
        let setter = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            setter.set();
        });

        bell.run(stop).await.expect("clean stop");

        let rings = rec.rings.lock().unwrap();
        assert!(!rings.is_empty());
        assert!(rings.iter().all(|v| (0.3..=1.0).contains(v)));
        let swings = rec.swings.lock().unwrap();
        assert!(swings.len() >= rings.len());
        assert!(swings.iter().all(|p| (-1.0..=1.0).contains(p)));
        assert!(*rec.rests.lock().unwrap() >= 1);
    }

    #[tokio::test]
    async fn never_rings_when_probability_is_zero() {
        let rec = Recorder::default();
        let cfg = BellConfig {
            trigger_probability: 0.0,
            ..eager()
        };
        let bell = BellLoop::new(cfg, rec.clone());
        let stop = StopSignal::new();
        let setter = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            setter.set();
        });

        bell.run(stop).await.expect("clean stop");
        assert!(rec.rings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn default_pause_is_cut_short_by_stop() {
        let bell = BellLoop::new(BellConfig::default(), TracingBell);
        let stop = StopSignal::new();
        stop.set();
        tokio::time::timeout(Duration::from_millis(200), bell.run(stop))
            .await
            .expect("no 10 s pause after stop")
            .expect("clean stop");
    }
}
