//! # Sound: ambient bed plus a randomized effect schedule.
//!
//! ```text
//! start:  ambient on channel 0, fade in
//! loop:   sleep until the earliest due effect (stop-aware)
//!         chains   every 15..120 s, volume 0..0.5
//!         groan    every 20..40 s,  volume 0..1
//!         rats     every 2..6 s,    random channel 1..=4
//!         scream   every 120 s
//! stop:   fade out ambient and rat channels
//! ```

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use super::{random_duration, random_f32};
use crate::core::StopSignal;
use crate::error::WorkerError;
use crate::workers::Worker;

/// Effect clips the board knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Background bed, looped on the ambient channel.
    Ambient,
    /// Rattling chains.
    Chains,
    /// Low groan.
    Groan,
    /// Scurrying rats.
    Rats,
    /// Periodic scream.
    Scream,
    /// Bell clip, played by the bell loop.
    Bell,
}

impl SoundEffect {
    /// Stable clip name, used in logs and as the asset stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Ambient => "ambient",
            SoundEffect::Chains => "chains",
            SoundEffect::Groan => "groan",
            SoundEffect::Rats => "rats",
            SoundEffect::Scream => "scream",
            SoundEffect::Bell => "bell",
        }
    }
}

/// Output side of the audio mixer.
pub trait SoundPlayer: Send + Sync + 'static {
    /// Starts `effect` on `channel`; `fade_in` of zero starts at full volume.
    fn play(
        &self,
        channel: u8,
        effect: SoundEffect,
        volume: f32,
        fade_in: Duration,
    ) -> Result<(), WorkerError>;

    /// Fades `channel` to silence over `fade`.
    fn fadeout(&self, channel: u8, fade: Duration) -> Result<(), WorkerError>;
}

/// Player that only logs what it would play.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPlayer;

impl SoundPlayer for TracingPlayer {
    fn play(
        &self,
        channel: u8,
        effect: SoundEffect,
        volume: f32,
        fade_in: Duration,
    ) -> Result<(), WorkerError> {
        tracing::debug!(
            target: "displayboard::sound",
            channel,
            effect = effect.as_str(),
            volume,
            fade_in_ms = fade_in.as_millis() as u64,
            "play"
        );
        Ok(())
    }

    fn fadeout(&self, channel: u8, fade: Duration) -> Result<(), WorkerError> {
        tracing::debug!(target: "displayboard::sound", channel, fade_ms = fade.as_millis() as u64, "fadeout");
        Ok(())
    }
}

/// Schedule and mixer tuning.
///
/// Ranges are inclusive `(min, max)` pairs; each effect draws a fresh value per play.
#[derive(Debug, Clone)]
pub struct SoundConfig {
    /// Mixer channel of the ambient bed.
    pub ambient_channel: u8,
    /// Fade-in of the ambient bed.
    pub ambient_fade: Duration,
    /// Volume of the ambient bed.
    pub ambient_volume: f32,
    /// Pause between chain clips.
    pub chains_every: (Duration, Duration),
    /// Volume of chain clips.
    pub chains_volume: (f32, f32),
    /// Pause between groans.
    pub groan_every: (Duration, Duration),
    /// Volume of groans.
    pub groan_volume: (f32, f32),
    /// Pause between rat clips.
    pub rats_every: (Duration, Duration),
    /// Inclusive channel range for rat clips.
    pub rats_channels: (u8, u8),
    /// Cross-fade when a rat clip replaces the previous one.
    pub rats_fade: Duration,
    /// Fixed pause between screams.
    pub scream_every: Duration,
    /// Ambient fade-out on stop.
    pub ambient_fadeout: Duration,
    /// Rat channel fade-out on stop.
    pub rats_fadeout: Duration,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            ambient_channel: 0,
            ambient_fade: Duration::from_millis(3000),
            ambient_volume: 0.75,
            chains_every: (Duration::from_secs(15), Duration::from_secs(120)),
            chains_volume: (0.0, 0.5),
            groan_every: (Duration::from_secs(20), Duration::from_secs(40)),
            groan_volume: (0.0, 1.0),
            rats_every: (Duration::from_secs(2), Duration::from_secs(6)),
            rats_channels: (1, 4),
            rats_fade: Duration::from_millis(500),
            scream_every: Duration::from_secs(120),
            ambient_fadeout: Duration::from_millis(2000),
            rats_fadeout: Duration::from_millis(1000),
        }
    }
}

/// Next due time per effect.
struct Schedule {
    chains: Instant,
    groan: Instant,
    rats: Instant,
    scream: Instant,
}

impl Schedule {
    fn earliest(&self) -> Instant {
        self.chains.min(self.groan).min(self.rats).min(self.scream)
    }
}

/// Background sound loop.
pub struct SoundLoop<P> {
    cfg: SoundConfig,
    player: P,
}

impl<P: SoundPlayer> SoundLoop<P> {
    /// Creates the loop playing through `player`.
    pub fn new(cfg: SoundConfig, player: P) -> Self {
        Self { cfg, player }
    }

    fn rats_channel(&self, rng: &mut StdRng) -> u8 {
        let (lo, hi) = self.cfg.rats_channels;
        rng.random_range(lo..=hi.max(lo))
    }

    /// Plays everything due at `now` and reschedules it.
    fn fire_due(&self, now: Instant, next: &mut Schedule, rng: &mut StdRng) -> Result<(), WorkerError> {
        let cfg = &self.cfg;
        if next.chains <= now {
            let vol = random_f32(rng, cfg.chains_volume.0, cfg.chains_volume.1);
            let ch = self.rats_channel(rng);
            self.player.play(ch, SoundEffect::Chains, vol, Duration::ZERO)?;
            next.chains = now + random_duration(rng, cfg.chains_every.0, cfg.chains_every.1);
        }
        if next.groan <= now {
            let vol = random_f32(rng, cfg.groan_volume.0, cfg.groan_volume.1);
            let ch = self.rats_channel(rng);
            self.player.play(ch, SoundEffect::Groan, vol, Duration::ZERO)?;
            next.groan = now + random_duration(rng, cfg.groan_every.0, cfg.groan_every.1);
        }
        if next.rats <= now {
            let ch = self.rats_channel(rng);
            self.player.fadeout(ch, cfg.rats_fade)?;
            self.player.play(ch, SoundEffect::Rats, 1.0, cfg.rats_fade)?;
            next.rats = now + random_duration(rng, cfg.rats_every.0, cfg.rats_every.1);
        }
        if next.scream <= now {
            let ch = self.rats_channel(rng);
            self.player.play(ch, SoundEffect::Scream, 1.0, Duration::ZERO)?;
            next.scream = now + cfg.scream_every;
        }
        Ok(())
    }

    fn fade_all(&self) {
        let cfg = &self.cfg;
        let (lo, hi) = cfg.rats_channels;
        let faded = std::iter::once((cfg.ambient_channel, cfg.ambient_fadeout))
            .chain((lo..=hi).map(|ch| (ch, cfg.rats_fadeout)));
        for (ch, fade) in faded {
            if let Err(e) = self.player.fadeout(ch, fade) {
                tracing::warn!(target: "displayboard::sound", channel = ch, error = %e, "fadeout failed");
            }
        }
    }
}

#[async_trait]
impl<P: SoundPlayer> Worker for SoundLoop<P> {
    fn name(&self) -> &str {
        "sound"
    }

    async fn run(&self, stop: StopSignal) -> Result<(), WorkerError> {
        let cfg = &self.cfg;
        let mut rng = StdRng::from_os_rng();

        self.player.play(
            cfg.ambient_channel,
            SoundEffect::Ambient,
            cfg.ambient_volume,
            cfg.ambient_fade,
        )?;

        let start = Instant::now();
        let mut next = Schedule {
            chains: start + random_duration(&mut rng, cfg.chains_every.0, cfg.chains_every.1),
            groan: start + random_duration(&mut rng, cfg.groan_every.0, cfg.groan_every.1),
            rats: start + random_duration(&mut rng, cfg.rats_every.0, cfg.rats_every.1),
            scream: start + cfg.scream_every,
        };

        let res = loop {
            let pause = next.earliest().saturating_duration_since(Instant::now());
            if stop.wait(pause).await {
                break Ok(());
            }
            if let Err(e) = self.fire_due(Instant::now(), &mut next, &mut rng) {
                break Err(e);
            }
        };

        self.fade_all();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play(u8, SoundEffect),
        Fade(u8),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Call>>>);

    impl SoundPlayer for Recorder {
        fn play(&self, ch: u8, fx: SoundEffect, _v: f32, _f: Duration) -> Result<(), WorkerError> {
            self.0.lock().unwrap().push(Call::Play(ch, fx));
            Ok(())
        }
        fn fadeout(&self, ch: u8, _f: Duration) -> Result<(), WorkerError> {
            self.0.lock().unwrap().push(Call::Fade(ch));
            Ok(())
        }
    }

    struct Muted;

    impl SoundPlayer for Muted {
        fn play(&self, _: u8, _: SoundEffect, _: f32, _: Duration) -> Result<(), WorkerError> {
            Err(WorkerError::fault("no audio device"))
        }
        fn fadeout(&self, _: u8, _: Duration) -> Result<(), WorkerError> {
            Ok(())
        }
    }

    fn fast() -> SoundConfig {
        let ms = Duration::from_millis;
        SoundConfig {
            chains_every: (ms(10), ms(20)),
            groan_every: (ms(10), ms(20)),
            rats_every: (ms(5), ms(10)),
            scream_every: ms(15),
            ..SoundConfig::default()
        }
    }

    #[tokio::test]
    async fn plays_ambient_then_effects_and_fades_on_stop() {
        let rec = Recorder::default();
        let sound = SoundLoop::new(fast(), rec.clone());
        let stop = StopSignal::new();
        let setter = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            setter.set();
        });

        sound.run(stop).await.expect("clean stop");

        let calls = rec.0.lock().unwrap();
        assert_eq!(calls[0], Call::Play(0, SoundEffect::Ambient));
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Play(1..=4, SoundEffect::Rats))));
        assert!(calls.iter().any(|c| matches!(c, Call::Play(_, SoundEffect::Scream))));
        // Ambient plus channels 1..=4 faded at the end.
        let tail: Vec<_> = calls[calls.len() - 5..].to_vec();
        assert_eq!(tail, (0..=4).map(Call::Fade).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn stop_interrupts_long_pause() {
        let sound = SoundLoop::new(SoundConfig::default(), TracingPlayer);
        let stop = StopSignal::new();
        let setter = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            setter.set();
        });
        tokio::time::timeout(Duration::from_secs(1), sound.run(stop))
            .await
            .expect("stopped without waiting for the next effect")
            .expect("clean stop");
    }

    #[tokio::test]
    async fn runs_by_hand_on_a_standalone_signal() {
        let rec = Recorder::default();
        let sound = Arc::new(SoundLoop::new(fast(), rec.clone()));
        let stop = StopSignal::standalone();

        let task = tokio::spawn({
            let sound = sound.clone();
            let stop = stop.clone();
            async move { sound.run(stop).await }
        });
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!task.is_finished(), "nothing but the caller sets a standalone signal");

        stop.set();
        let res = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("stopped once the caller set it")
            .expect("task not panicked");
        assert_eq!(res, Ok(()));
        assert!(rec.0.lock().unwrap().contains(&Call::Fade(0)));
    }

    #[tokio::test]
    async fn player_failure_is_a_fault() {
        let sound = SoundLoop::new(SoundConfig::default(), Muted);
        let err = sound.run(StopSignal::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "worker_fault");
    }
}
