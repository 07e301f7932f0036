//! Tunable constants for timeline generation and the animation loop.
//!
//! Every field carries its unit. Defaults reproduce the behavior avatars were tuned
//! against, so most callers never need a config file.

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Unable to read config: {e}"),
            Self::Parse(e) => write!(f, "Unable to parse config: {e}"),
            Self::Invalid { field, reason } => write!(f, "Invalid config value {field}: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

type Result<T> = std::result::Result<T, Error>;

/// How text is turned into event durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Duration of one syllable at speech rate 1.0 (milliseconds).
    pub base_syllable_ms: f64,
    /// Lower bound of the characters-per-syllable factor (dimensionless).
    pub complexity_min: f64,
    /// Upper bound of the characters-per-syllable factor (dimensionless).
    pub complexity_max: f64,
    /// Fraction of a phoneme's duration each event extends into its neighbours.
    /// Must be in `[0, 0.5)`.
    pub overlap_fraction: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_syllable_ms: 350.0,
            complexity_min: 0.8,
            complexity_max: 1.5,
            overlap_fraction: 0.1,
        }
    }
}

/// How an active event becomes channel targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Multiplier applied to event intensity before writing targets.
    pub intensity_gain: f32,
    /// Extra multiplier for jaw and mouth-opening channels.
    pub open_channel_boost: f32,
    /// Ceiling for jaw and mouth-opening channels after the boost.
    pub open_channel_cap: f32,
    /// Share of the jittered intensity used as a floor for `mouthOpen` and `jawOpen`.
    pub jitter_floor_fraction: f32,
    /// Smallest random jitter multiplier.
    pub jitter_min: f32,
    /// Width of the random jitter range, so jitter is in `[jitter_min, jitter_min + jitter_span)`.
    pub jitter_span: f32,
    /// Intensity reported for gaps between events.
    pub gap_intensity: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            intensity_gain: 1.8,
            open_channel_boost: 1.2,
            open_channel_cap: 1.5,
            jitter_floor_fraction: 0.3,
            jitter_min: 0.8,
            jitter_span: 0.4,
            gap_intensity: 0.2,
        }
    }
}

/// Exponential smoothing of displayed weights toward targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Interpolation rate when the target is below the displayed weight (per second).
    pub closing_rate_per_s: f32,
    /// Interpolation rate when the target is above the displayed weight (per second).
    pub opening_rate_per_s: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            closing_rate_per_s: 15.0,
            opening_rate_per_s: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    pub timing: TimingConfig,
    pub targets: TargetConfig,
    pub smoothing: SmoothingConfig,
    /// Speech rate used when the caller does not pass one (1.0 is normal speed).
    pub default_speech_rate: f32,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            targets: TargetConfig::default(),
            smoothing: SmoothingConfig::default(),
            default_speech_rate: 0.9,
        }
    }
}

impl LipSyncConfig {
    /// Read and validate a JSON config. Missing fields fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(Error::Io)?;

        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(data).map_err(Error::Parse)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::Invalid {
                    field,
                    reason: format!("must be positive and finite, got {v}"),
                })
            }
        }

        let timing = &self.timing;
        positive("timing.base_syllable_ms", timing.base_syllable_ms)?;
        positive("timing.complexity_min", timing.complexity_min)?;
        positive("timing.complexity_max", timing.complexity_max)?;
        if timing.complexity_min > timing.complexity_max {
            return Err(Error::Invalid {
                field: "timing.complexity_min",
                reason: format!(
                    "{} is greater than complexity_max {}",
                    timing.complexity_min, timing.complexity_max
                ),
            });
        }
        if !(0.0..0.5).contains(&timing.overlap_fraction) {
            return Err(Error::Invalid {
                field: "timing.overlap_fraction",
                reason: format!("must be in [0, 0.5), got {}", timing.overlap_fraction),
            });
        }

        let targets = &self.targets;
        for (field, v) in [
            ("targets.intensity_gain", targets.intensity_gain),
            ("targets.open_channel_boost", targets.open_channel_boost),
            ("targets.open_channel_cap", targets.open_channel_cap),
            ("targets.jitter_floor_fraction", targets.jitter_floor_fraction),
            ("targets.jitter_min", targets.jitter_min),
            ("targets.gap_intensity", targets.gap_intensity),
            ("smoothing.closing_rate_per_s", self.smoothing.closing_rate_per_s),
            ("smoothing.opening_rate_per_s", self.smoothing.opening_rate_per_s),
            ("default_speech_rate", self.default_speech_rate),
        ] {
            positive(field, f64::from(v))?;
        }
        if !targets.jitter_span.is_finite() || targets.jitter_span < 0.0 {
            return Err(Error::Invalid {
                field: "targets.jitter_span",
                reason: format!("must be zero or positive, got {}", targets.jitter_span),
            });
        }

        Ok(())
    }
}
