//! Per-frame lookup of the active viseme and conversion into channel targets.

use log::trace;
use rand::Rng;
use serde::Serialize;

use crate::{
    config::TargetConfig,
    model::{MorphChannels, Viseme, VisemeTimeline},
};

/// Channels that get a randomized opening floor while a viseme is active.
pub const ALWAYS_ON_CHANNELS: [&str; 2] = ["mouthOpen", "jawOpen"];

/// What the timeline says at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub viseme: Viseme,
    pub intensity: f32,
    pub elapsed_ms: f64,
    /// Whether an event matched. A gap samples as silence.
    pub active: bool,
}

/// Whether a channel opens the jaw or mouth and therefore gets the extra boost.
pub fn is_opening_channel(name: &str) -> bool {
    name.contains("Open") || name.contains("jaw")
}

/// Look up the event active at `elapsed_ms`.
///
/// Gaps, including anything past the last event, sample as silence at the gap
/// intensity rather than holding the last active viseme.
pub fn sample(timeline: &VisemeTimeline, elapsed_ms: f64, config: &TargetConfig) -> Sample {
    match timeline.active_at(elapsed_ms) {
        Some(v) => Sample {
            viseme: v.viseme,
            intensity: v.intensity,
            elapsed_ms,
            active: true,
        },
        None => Sample {
            viseme: Viseme::Sil,
            intensity: config.gap_intensity,
            elapsed_ms,
            active: false,
        },
    }
}

/// Rewrite `channels` targets for `sample`.
///
/// Targets are reset to baseline first, then the viseme's channels are set to the
/// amplified intensity. Opening channels get an extra boost up to the cap, and
/// `mouthOpen`/`jawOpen` get a randomized floor for micro-variation. Silence leaves
/// everything at baseline. Channels the model lacks are skipped.
pub fn apply_targets<R: Rng>(
    sample: &Sample,
    channels: &mut MorphChannels,
    config: &TargetConfig,
    rng: &mut R,
) {
    channels.reset_targets();

    if sample.viseme.is_silence() {
        return;
    }

    let intensity = sample.intensity * config.intensity_gain;
    for name in sample.viseme.channels() {
        let weight = if is_opening_channel(name) {
            (intensity * config.open_channel_boost).min(config.open_channel_cap)
        } else {
            intensity
        };

        if !channels.set_target(name, weight) {
            trace!("Model has no channel {name}, skipping");
        }
    }

    let jitter = config.jitter_min + rng.gen::<f32>() * config.jitter_span;
    let floor = intensity * jitter * config.jitter_floor_fraction;
    for name in ALWAYS_ON_CHANNELS {
        channels.raise_target(name, floor);
    }
}

/// Sample the timeline and write the resulting targets in one step.
pub fn sample_and_apply<R: Rng>(
    timeline: &VisemeTimeline,
    elapsed_ms: f64,
    channels: &mut MorphChannels,
    config: &TargetConfig,
    rng: &mut R,
) -> Sample {
    let sample = sample(timeline, elapsed_ms, config);
    apply_targets(&sample, channels, config, rng);

    sample
}
