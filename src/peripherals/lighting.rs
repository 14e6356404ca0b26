//! # LED strip: breathing green glow with random flicker.
//!
//! Every frame the whole strip is scaled by a slow sine "breathe" brightness; each
//! pixel independently flickers to a random colour with a fixed probability, and
//! otherwise shows the dim base green. Frame math is pure ([`render_frame`]) so it
//! can be checked without a strip.

use std::f64::consts::PI;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::workers::Worker;

/// One pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pixel switched off.
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Builds a pixel from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn scaled(self, k: f64) -> Self {
        let k = k.clamp(0.0, 1.0);
        let s = |c: u8| (f64::from(c) * k).round() as u8;
        Self::new(s(self.r), s(self.g), s(self.b))
    }
}

/// Output side of the LED strip.
pub trait PixelSink: Send + Sync + 'static {
    /// Pushes one full frame to the strip.
    fn show(&self, frame: &[Rgb]) -> Result<(), WorkerError>;
}

/// Sink that records frames at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPixels;

impl PixelSink for TracingPixels {
    fn show(&self, frame: &[Rgb]) -> Result<(), WorkerError> {
        let lit = frame.iter().filter(|p| **p != Rgb::OFF).count();
        tracing::trace!(target: "displayboard::lighting", pixels = frame.len(), lit, "frame");
        Ok(())
    }
}

/// Animation tuning.
///
/// Defaults: 30 pixels at 0.4 brightness, 50 ms frames, 0.5 Hz breathe between
/// 0.2 and 1.0, 20 % flicker chance.
#[derive(Debug, Clone)]
pub struct LightingConfig {
    /// Number of pixels on the strip.
    pub pixels: usize,
    /// Global strip brightness applied on top of the animation.
    pub brightness: f64,
    /// Time between frames; also the stop latency.
    pub frame_interval: Duration,
    /// Breathe cycles per second.
    pub breathe_frequency: f64,
    /// Lowest breathe level.
    pub breathe_min: f64,
    /// Breathe swing above `breathe_min`.
    pub breathe_range: f64,
    /// Chance per pixel per frame of a flicker.
    pub flicker_probability: f64,
    /// Inclusive red range of a flicker.
    pub flicker_r: (u8, u8),
    /// Inclusive green range of a flicker.
    pub flicker_g: (u8, u8),
    /// Inclusive blue range of a flicker.
    pub flicker_b: (u8, u8),
    /// Green level of a pixel that is not flickering.
    pub base_g: u8,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            pixels: 30,
            brightness: 0.4,
            frame_interval: Duration::from_millis(50),
            breathe_frequency: 0.5,
            breathe_min: 0.2,
            breathe_range: 0.8,
            flicker_probability: 0.2,
            flicker_r: (0, 30),
            flicker_g: (50, 255),
            flicker_b: (0, 20),
            base_g: 50,
        }
    }
}

/// Breathe brightness at `t` seconds: `min + range * (sin(2π f t) + 1) / 2`.
pub fn breathe_brightness(cfg: &LightingConfig, t: f64) -> f64 {
    let wave = ((t * cfg.breathe_frequency * 2.0 * PI).sin() + 1.0) / 2.0;
    cfg.breathe_min + cfg.breathe_range * wave
}

/// Renders the frame at `t` seconds into `out`.
pub fn render_frame<R: Rng + ?Sized>(cfg: &LightingConfig, t: f64, rng: &mut R, out: &mut [Rgb]) {
    let level = breathe_brightness(cfg, t) * cfg.brightness;
    for px in out.iter_mut() {
        let raw = if rng.random_bool(cfg.flicker_probability.clamp(0.0, 1.0)) {
            Rgb::new(
                rng.random_range(cfg.flicker_r.0..=cfg.flicker_r.1.max(cfg.flicker_r.0)),
                rng.random_range(cfg.flicker_g.0..=cfg.flicker_g.1.max(cfg.flicker_g.0)),
                rng.random_range(cfg.flicker_b.0..=cfg.flicker_b.1.max(cfg.flicker_b.0)),
            )
        } else {
            Rgb::new(0, cfg.base_g, 0)
        };
        *px = raw.scaled(level);
    }
}

/// Background LED animation loop.
pub struct LightingLoop<S> {
    cfg: LightingConfig,
    sink: S,
}

impl<S: PixelSink> LightingLoop<S> {
    /// Creates the loop; it drives `sink` once per frame.
    pub fn new(cfg: LightingConfig, sink: S) -> Self {
        Self { cfg, sink }
    }
}

#[async_trait]
impl<S: PixelSink> Worker for LightingLoop<S> {
    fn name(&self) -> &str {
        "lighting"
    }

    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
        let mut rng = StdRng::from_os_rng();
        let mut frame = vec![Rgb::OFF; self.cfg.pixels];
        let started = Instant::now();

        let res = loop {
            render_frame(&self.cfg, started.elapsed().as_secs_f64(), &mut rng, &mut frame);
            if let Err(e) = self.sink.show(&frame) {
                break Err(e);
            }
            if stop.wait(self.cfg.frame_interval).await {
                break Ok(());
            }
        };

        frame.fill(Rgb::OFF);
        if let Err(e) = self.sink.show(&frame) {
            tracing::warn!(target: "displayboard::lighting", error = %e, "failed to clear strip");
        }
        res
    }
}
