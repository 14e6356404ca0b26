//! Command-line flags of the `displayboard` binary.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::config::WorkerConfig;
use crate::peripherals::VideoConfig;

/// Haunted display board: sound, lights, bell and video.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "displayboard", version, about = "Haunted display board runtime")]
pub struct Cli {
    /// Disable the sound loop
    #[arg(long)]
    pub no_sounds: bool,

    /// Disable the LED lighting loop
    #[arg(long)]
    pub no_lighting: bool,

    /// Disable the video loop (idle wait instead)
    #[arg(long)]
    pub no_video: bool,

    /// Disable the bell loop
    #[arg(long)]
    pub no_bell: bool,

    /// Debug-level logging
    #[arg(long)]
    pub debug: bool,

    /// Info-level logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Start the workers, then shut down straight away (smoke test)
    #[arg(long)]
    pub test_exit: bool,

    /// Video file to loop
    #[arg(long, default_value = "assets/video/main_loop.mp4")]
    pub video_file: PathBuf,

    /// Video player executable
    #[arg(long, default_value = "mpv")]
    pub video_player: String,
}

impl Cli {
    /// Which subsystems run, from the `--no-*` and `--test-exit` flags.
    pub fn to_worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            sounds_enabled: !self.no_sounds,
            lighting_enabled: !self.no_lighting,
            bell_enabled: !self.no_bell,
            video_enabled: !self.no_video,
            exit_after_start: self.test_exit,
        }
    }

    /// Video loop settings with the player and file overridden from flags.
    pub fn to_video_config(&self) -> VideoConfig {
        VideoConfig {
            player: self.video_player.clone(),
            file: self.video_file.clone(),
            ..VideoConfig::default()
        }
    }

    /// `--debug` wins over `--verbose`; warnings only otherwise.
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("displayboard").chain(args.iter().copied()))
            .expect("valid flags")
    }

    #[test]
    fn no_flags_enable_everything_at_warn() {
        let cli = parse(&[]);
        assert_eq!(cli.to_worker_config(), WorkerConfig::default());
        assert_eq!(cli.log_level(), Level::WARN);
    }

    #[test]
    fn disable_flags_map_to_worker_config() {
        let cfg = parse(&["--no-sounds", "--no-bell", "--test-exit"]).to_worker_config();
        assert!(!cfg.sounds_enabled);
        assert!(cfg.lighting_enabled);
        assert!(!cfg.bell_enabled);
        assert!(cfg.video_enabled);
        assert!(cfg.exit_after_start);

        let cfg = parse(&["--no-sounds", "--no-lighting", "--no-bell", "--no-video"])
            .to_worker_config();
        assert_eq!(cfg, WorkerConfig::none());
    }

    #[test]
    fn debug_beats_verbose() {
        assert_eq!(parse(&["--verbose"]).log_level(), Level::INFO);
        assert_eq!(parse(&["--verbose", "--debug"]).log_level(), Level::DEBUG);
    }

    #[test]
    fn video_overrides_pass_through() {
        let video = parse(&["--video-file", "clip.mkv", "--video-player", "vlc"]).to_video_config();
        assert_eq!(video.file, PathBuf::from("clip.mkv"));
        assert_eq!(video.player, "vlc");
        assert_eq!(video.exit_timeout, VideoConfig::default().exit_timeout);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["displayboard", "--no-smoke"]).is_err());
    }
}
