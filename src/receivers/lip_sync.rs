/*!
A receiver that lip-syncs a puppet to synthesized speech.

The speech output generates a [VisemeTimeline] once per utterance and starts playback
right as audio starts. Every display frame [LipSync::tick] samples the timeline against
the clock, rewrites channel targets and smooths displayed weights toward them.

Playback ends when the clock passes the end of the last event or when [LipSync::stop]
is called. Either way channels snap straight back to their baseline instead of easing
out, so a cancelled utterance never leaves the mouth open. Replacing an utterance with
a timeline that has nothing to play resets on the next tick.
*/

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    clock::Clock,
    config::LipSyncConfig,
    generator::{self, TimelineGenerator},
    model::{MorphChannels, VisemeTimeline},
    sampler::{self, Sample},
    Logger,
};

use super::Receiver;

/// The result of one [LipSync::tick].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Nothing is playing, channels ease toward baseline.
    Idle,
    /// An utterance is playing.
    Speaking(Sample),
    /// Playback ended on this tick, either by running past the end of the timeline or
    /// by being replaced with nothing to play, and channels were reset.
    Finished,
}

#[derive(Debug)]
enum PlaybackState {
    Idle,
    Speaking {
        timeline: VisemeTimeline,
        started_at_ms: f64,
        duration_ms: f64,
    },
}

#[derive(Debug)]
pub struct LipSync<C: Clock, R: Rng = StdRng> {
    logger: Logger,
    config: LipSyncConfig,
    generator: TimelineGenerator,
    clock: C,
    rng: R,

    state: PlaybackState,
    /// Clock reading of the previous tick, used for frame-rate independent smoothing.
    last_tick_ms: Option<f64>,
    /// Playback ended outside of a tick and channels still need a hard reset.
    pending_reset: bool,
}

impl<C: Clock> LipSync<C> {
    pub fn new(config: LipSyncConfig, clock: C) -> Self {
        Self::with_rng(config, clock, StdRng::from_entropy())
    }
}

impl<C: Clock, R: Rng> LipSync<C, R> {
    /// Create a receiver with a specific source of jitter. Seeded rngs make the
    /// animation reproducible.
    pub fn with_rng(config: LipSyncConfig, clock: C, rng: R) -> Self {
        Self {
            logger: Logger::create("LipSync"),
            generator: TimelineGenerator::new(config.timing.clone()),
            config,
            clock,
            rng,

            state: PlaybackState::Idle,
            last_tick_ms: None,
            pending_reset: false,
        }
    }

    pub fn config(&self) -> &LipSyncConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Generate a timeline for `text` and start playing it.
    ///
    /// Uses the configured default speech rate when `speech_rate` is `None`.
    ///
    /// # Return
    /// Whether playback started. Text without any words does not start playback.
    pub fn speak(
        &mut self,
        text: &str,
        speech_rate: Option<f32>,
    ) -> Result<bool, generator::Error> {
        let speech_rate = speech_rate.unwrap_or(self.config.default_speech_rate);
        let timeline = self.generator.generate(text, speech_rate)?;

        Ok(self.start(timeline))
    }

    /// Time since playback started, if anything is playing.
    pub fn elapsed_ms(&self) -> Option<f64> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Speaking { started_at_ms, .. } => {
                Some(self.clock.now_ms() - started_at_ms)
            }
        }
    }

    pub fn timeline(&self) -> Option<&VisemeTimeline> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Speaking { timeline, .. } => Some(timeline),
        }
    }

    fn finish(&mut self, channels: &mut MorphChannels) {
        self.state = PlaybackState::Idle;
        self.pending_reset = false;
        channels.hard_reset();
    }
}

impl<C: Clock, R: Rng> Receiver for LipSync<C, R> {
    type Input = VisemeTimeline;
    type Output = Tick;

    /// Start playing `timeline` from the current clock reading.
    ///
    /// An empty or zero-length timeline leaves the receiver idle.
    fn start(&mut self, timeline: VisemeTimeline) -> bool {
        let duration_ms = timeline.duration_ms();
        if timeline.is_empty() || !duration_ms.is_finite() || duration_ms <= 0.0 {
            if self.is_running() {
                self.logger
                    .debug("Utterance replaced with nothing to play, resetting on next tick");
                self.pending_reset = true;
            } else {
                self.logger.debug("Timeline has nothing to play, staying idle");
            }
            self.state = PlaybackState::Idle;
            return false;
        }

        if self.is_running() {
            self.logger.debug("Replacing the current utterance");
        }

        self.pending_reset = false;
        let started_at_ms = self.clock.now_ms();
        self.logger.debug(format!(
            "Starting playback of {} events over {duration_ms:.1}ms",
            timeline.len()
        ));
        self.state = PlaybackState::Speaking {
            timeline,
            started_at_ms,
            duration_ms,
        };

        true
    }

    fn tick(&mut self, channels: &mut MorphChannels) -> Tick {
        let now = self.clock.now_ms();
        let delta_s = match self.last_tick_ms.replace(now) {
            Some(last) if now >= last => (now - last) / 1000.0,
            Some(last) => {
                self.logger.trace(format!("Clock went backwards by {:.1}ms", last - now));
                0.0
            }
            None => 0.0,
        };

        if self.pending_reset {
            self.finish(channels);
            return Tick::Finished;
        }

        let (timeline, elapsed_ms) = match &self.state {
            PlaybackState::Idle => {
                channels.reset_targets();
                channels.smooth(delta_s, &self.config.smoothing);
                return Tick::Idle;
            }
            PlaybackState::Speaking {
                timeline,
                started_at_ms,
                duration_ms,
            } => {
                let elapsed_ms = now - started_at_ms;
                if !elapsed_ms.is_finite() || elapsed_ms > *duration_ms {
                    self.logger.debug(format!("Playback finished after {elapsed_ms:.1}ms"));
                    self.finish(channels);
                    return Tick::Finished;
                }

                (timeline, elapsed_ms)
            }
        };

        let sample = sampler::sample_and_apply(
            timeline,
            elapsed_ms,
            channels,
            &self.config.targets,
            &mut self.rng,
        );
        channels.smooth(delta_s, &self.config.smoothing);

        Tick::Speaking(sample)
    }

    fn stop(&mut self, channels: &mut MorphChannels) {
        if self.is_running() {
            self.logger.debug("Playback stopped");
        }

        self.finish(channels);
    }

    fn is_running(&self) -> bool {
        matches!(self.state, PlaybackState::Speaking { .. })
    }
}
