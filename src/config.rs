//! # Runtime and worker configuration.
//!
//! Provides two settings types:
//! - [`Config`]: runtime tuning for the coordinator (intervals, join bounds, bus size).
//! - [`WorkerConfig`]: which peripheral subsystems are enabled for this run.
//!
//! Both are built once at startup and never mutated afterwards.

use std::time::Duration;

/// Runtime tuning for the shutdown coordinator.
///
/// ## Field semantics
/// - `idle_interval`: sleep slice of the idle foreground wait (video disabled)
/// - `join_timeout`: bound on each background worker join during shutdown
/// - `foreground_grace`: how long an interrupted video loop may take to wind down
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `flush_timeout`: bound on draining subscriber queues before `run` returns
#[derive(Clone, Debug)]
pub struct Config {
    /// Idle wait slice used when the video loop is disabled.
    ///
    /// Bounds how long the foreground takes to notice a stop request.
    pub idle_interval: Duration,

    /// Maximum wait per background worker during the join phase.
    ///
    /// A worker still running after this is detached, never killed.
    pub join_timeout: Duration,

    /// Wind-down window for the video loop after an external interrupt.
    pub foreground_grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Maximum wait for subscribers to drain their queues at the end of a run.
    pub flush_timeout: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `idle_interval = 1s`
    /// - `join_timeout = 2s`
    /// - `foreground_grace = 5s` (video player termination wait)
    /// - `bus_capacity = 1024`
    /// - `flush_timeout = 1s`
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_secs(1),
            join_timeout: Duration::from_secs(2),
            foreground_grace: Duration::from_secs(5),
            bus_capacity: 1024,
            flush_timeout: Duration::from_secs(1),
        }
    }
}

/// Which peripheral subsystems run, plus passthrough options.
///
/// Every subsystem is enabled by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Ambient sound and effects loop (background).
    pub sounds_enabled: bool,
    /// LED animation loop (background).
    pub lighting_enabled: bool,
    /// Bell actuator loop (background).
    pub bell_enabled: bool,
    /// Looping video (foreground).
    pub video_enabled: bool,
    /// Start workers, then go straight to shutdown without the foreground phase.
    ///
    /// Used to smoke-test process startup.
    pub exit_after_start: bool,
}

impl WorkerConfig {
    /// Everything disabled; handy as a starting point in tests.
    pub fn none() -> Self {
        Self {
            sounds_enabled: false,
            lighting_enabled: false,
            bell_enabled: false,
            video_enabled: false,
            exit_after_start: false,
        }
    }

    /// Number of enabled background subsystems (sound, lighting, bell).
    pub fn background_count(&self) -> usize {
        [self.sounds_enabled, self.lighting_enabled, self.bell_enabled]
            .into_iter()
            .filter(|on| *on)
            .count()
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sounds_enabled: true,
            lighting_enabled: true,
            bell_enabled: true,
            video_enabled: true,
            exit_after_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let cfg = WorkerConfig::default();
        assert!(cfg.sounds_enabled && cfg.lighting_enabled && cfg.bell_enabled && cfg.video_enabled);
        assert!(!cfg.exit_after_start);
        assert_eq!(cfg.background_count(), 3);
    }

    #[test]
    fn background_count_ignores_video() {
        let cfg = WorkerConfig {
            video_enabled: true,
            bell_enabled: true,
            ..WorkerConfig::none()
        };
        assert_eq!(cfg.background_count(), 1);
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
