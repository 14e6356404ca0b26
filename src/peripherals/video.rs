//! # Video: looping fullscreen playback through an external player.
//!
//! The player process belongs to this loop only. On stop it is killed and reaped
//! within [`VideoConfig::exit_timeout`]; `kill_on_drop` covers the case where the
//! loop future itself is dropped.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::workers::Worker;

/// Player command line and shutdown bound.
///
/// The player runs as `player <player_args...> <file>`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use displayboard::peripherals::VideoConfig;
///
/// let cfg = VideoConfig { player: "vlc".into(), ..VideoConfig::default() };
/// assert_eq!(cfg.file.to_str(), Some("assets/video/main_loop.mp4"));
/// assert_eq!(cfg.exit_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct VideoConfig {
    /// Player executable, looked up on `PATH`.
    pub player: String,
    /// Arguments placed before the file.
    pub player_args: Vec<String>,
    /// Video file to loop; must exist when the loop starts.
    pub file: PathBuf,
    /// How long a killed player may take to exit.
    pub exit_timeout: Duration,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            player: "mpv".into(),
            player_args: vec![
                "--loop-file=inf".into(),
                "--fs".into(),
                "--no-osc".into(),
                "--really-quiet".into(),
            ],
            file: PathBuf::from("assets/video/main_loop.mp4"),
            exit_timeout: Duration::from_secs(5),
        }
    }
}

/// Foreground video loop.
pub struct VideoLoop {
    cfg: VideoConfig,
}

impl VideoLoop {
    /// Creates the loop; the player is spawned on each [`Worker::run`].
    pub fn new(cfg: VideoConfig) -> Self {
        Self { cfg }
    }

    fn spawn_player(&self) -> Result<Child, WorkerError> {
        Command::new(&self.cfg.player)
            .args(&self.cfg.player_args)
            .arg(&self.cfg.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WorkerError::fault(format!("cannot start {}: {e}", self.cfg.player)))
    }

    async fn shut_player(&self, child: &mut Child) {
        if let Err(e) = child.start_kill() {
            tracing::debug!(target: "displayboard::video", error = %e, "player already gone");
        }
        match tokio::time::timeout(self.cfg.exit_timeout, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(target: "displayboard::video", %status, "player exited");
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "displayboard::video", error = %e, "failed to reap player");
            }
            Err(_) => {
                tracing::warn!(
                    target: "displayboard::video",
                    timeout_ms = self.cfg.exit_timeout.as_millis() as u64,
                    "player did not exit in time"
                );
            }
        }
    }
}

#[async_trait]
impl Worker for VideoLoop {
    fn name(&self) -> &str {
        "video"
    }

    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
        match tokio::fs::try_exists(&self.cfg.file).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(WorkerError::fault(format!(
                    "video file not found: {}",
                    self.cfg.file.display()
                )))
            }
            Err(e) => return Err(WorkerError::fault(e.to_string())),
        }

        let mut child = self.spawn_player()?;
        tracing::info!(
            target: "displayboard::video",
            player = %self.cfg.player,
            file = %self.cfg.file.display(),
            "playing"
        );

        let exited = tokio::select! {
            _ = stop.stopped() => None,
            status = child.wait() => Some(status),
        };

        match exited {
            None => {
                self.shut_player(&mut child).await;
                Ok(())
            }
            Some(Ok(status)) if status.success() => Ok(()),
            Some(Ok(status)) => Err(WorkerError::fault(format!("player exited with {status}"))),
            Some(Err(e)) => Err(WorkerError::fault(e.to_string())),
        }
    }
}
