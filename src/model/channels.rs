use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SmoothingConfig;

/// Weights for a single morph channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeMapping {
    /// The weight recorded when the model was loaded. This is the rest pose.
    pub baseline: f32,
    /// The weight the animation loop is moving toward.
    pub target: f32,
    /// The weight currently shown on the model.
    pub value: f32,
}

impl BlendShapeMapping {
    pub fn new(baseline: f32) -> Self {
        Self {
            baseline,
            target: baseline,
            value: baseline,
        }
    }

    fn smooth(&mut self, delta_s: f32, smoothing: &SmoothingConfig) {
        // Closing and opening ease at different rates
        let rate = if self.target < self.value {
            smoothing.closing_rate_per_s
        } else {
            smoothing.opening_rate_per_s
        };
        let factor = (delta_s * rate).min(1.0);

        self.value += (self.target - self.value) * factor;
    }
}

/// The named morph channels of one avatar.
///
/// Owned by whatever renders the model and passed by reference into the animation loop.
/// Channels a viseme asks for but the model does not have are skipped, since different
/// avatars expose different channel sets.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphChannels {
    mappings: BTreeMap<String, BlendShapeMapping>,
}

impl MorphChannels {
    /// Capture channels with their neutral weights.
    pub fn from_baseline<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        Self {
            mappings: channels
                .into_iter()
                .map(|(k, v)| (k.into(), BlendShapeMapping::new(v)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mappings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BlendShapeMapping> {
        self.mappings.get(name)
    }

    /// The displayed weight of a channel.
    pub fn value(&self, name: &str) -> Option<f32> {
        self.mappings.get(name).map(|v| v.value)
    }

    pub fn target(&self, name: &str) -> Option<f32> {
        self.mappings.get(name).map(|v| v.target)
    }

    /// Set a channel's target. Returns `false` if the model has no such channel.
    pub fn set_target(&mut self, name: &str, target: f32) -> bool {
        match self.mappings.get_mut(name) {
            Some(v) => {
                v.target = target;
                true
            }
            None => false,
        }
    }

    /// Raise a channel's target to at least `floor`.
    pub fn raise_target(&mut self, name: &str, floor: f32) -> bool {
        match self.mappings.get_mut(name) {
            Some(v) => {
                v.target = v.target.max(floor);
                true
            }
            None => false,
        }
    }

    /// Point every target back at its baseline. Displayed weights are left to the
    /// smoothing step.
    pub fn reset_targets(&mut self) {
        for v in self.mappings.values_mut() {
            v.target = v.baseline;
        }
    }

    /// Snap targets and displayed weights to the baseline, bypassing smoothing.
    pub fn hard_reset(&mut self) {
        for v in self.mappings.values_mut() {
            *v = BlendShapeMapping::new(v.baseline);
        }
    }

    /// Move every displayed weight toward its target.
    ///
    /// `delta_s` is the real time since the previous tick. A zero, negative or
    /// non-finite delta leaves the weights untouched.
    pub fn smooth(&mut self, delta_s: f64, smoothing: &SmoothingConfig) {
        if !delta_s.is_finite() || delta_s <= 0.0 {
            return;
        }

        let delta_s = delta_s as f32;
        for v in self.mappings.values_mut() {
            v.smooth(delta_s, smoothing);
        }
    }

    /// Displayed weights by channel name.
    pub fn values(&self) -> BTreeMap<&str, f32> {
        self.mappings
            .iter()
            .map(|(k, v)| (k.as_str(), v.value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlendShapeMapping)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }
}
