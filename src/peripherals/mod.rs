//! Reference peripheral loops driven by the runtime.
//!
//! Every loop is a [`Worker`](crate::Worker). Hardware output goes through a small sink
//! trait per peripheral; the default sinks only emit `tracing` records, so the whole
//! board can run on a machine without GPIO, speakers or a display.
//!
//! | Loop             | Role        | Sink                |
//! |------------------|-------------|---------------------|
//! | [`SoundLoop`]    | background  | [`SoundPlayer`]     |
//! | [`LightingLoop`] | background  | [`PixelSink`]       |
//! | [`BellLoop`]     | background  | [`BellActuator`]    |
//! | [`VideoLoop`]    | foreground  | external player     |

mod bell;
mod lighting;
mod sound;
mod video;

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

pub use bell::{BellActuator, BellConfig, BellLoop, TracingBell};
pub use lighting::{breathe_brightness, render_frame, LightingConfig, LightingLoop, PixelSink, Rgb, TracingPixels};
pub use sound::{SoundConfig, SoundEffect, SoundLoop, SoundPlayer, TracingPlayer};
pub use video::{VideoConfig, VideoLoop};

use crate::workers::Subsystems;

/// Builds the four loops with their tracing-backed sinks.
pub fn default_subsystems(video: VideoConfig) -> Subsystems {
    Subsystems::new(
        Arc::new(SoundLoop::new(SoundConfig::default(), TracingPlayer)),
        Arc::new(LightingLoop::new(LightingConfig::default(), TracingPixels)),
        Arc::new(BellLoop::new(BellConfig::default(), TracingBell)),
        Arc::new(VideoLoop::new(video)),
    )
}

/// Uniform duration in `[min, max]`.
pub(crate) fn random_duration<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    Duration::from_secs_f64(rng.random_range(min.as_secs_f64()..=max.as_secs_f64()))
}

/// Uniform `f32` in `[min, max]`.
pub(crate) fn random_f32<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}
