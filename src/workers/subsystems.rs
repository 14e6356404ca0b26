//! # The four peripheral loops the coordinator dispatches to.

use std::fmt;

use super::WorkerRef;

/// Sound, lighting and bell run as background tasks; video is the foreground loop.
#[derive(Clone)]
pub struct Subsystems {
    /// Ambient sound and effects loop.
    pub sound: WorkerRef,
    /// LED animation loop.
    pub lighting: WorkerRef,
    /// Bell actuator loop.
    pub bell: WorkerRef,
    /// Looping video display (foreground only).
    pub video: WorkerRef,
}

impl Subsystems {
    /// Bundles the four loops.
    pub fn new(sound: WorkerRef, lighting: WorkerRef, bell: WorkerRef, video: WorkerRef) -> Self {
        Self {
            sound,
            lighting,
            bell,
            video,
        }
    }
}

impl fmt::Debug for Subsystems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subsystems")
            .field("sound", &self.sound.name())
            .field("lighting", &self.lighting.name())
            .field("bell", &self.bell.name())
            .field("video", &self.video.name())
            .finish()
    }
}
