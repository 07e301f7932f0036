use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::Viseme;

/// One timed mouth shape. Times are milliseconds relative to the start of the utterance.
///
/// Neighbouring events overlap slightly, so `[start, end]` ranges are not a partition
/// of time. The first event of an utterance starts slightly before zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisemeEvent {
    pub viseme: Viseme,
    /// Dimensionless mouth-opening strength, roughly 0.5 to 1.2. Not normalized.
    pub intensity: f32,
    pub start: f64,
    pub end: f64,
}

impl VisemeEvent {
    pub fn contains(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.start && elapsed_ms <= self.end
    }
}

/// The ordered, immutable sequence of [VisemeEvent]s for one utterance.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisemeTimeline(Vec<VisemeEvent>);

impl VisemeTimeline {
    pub fn events(&self) -> &[VisemeEvent] {
        &self.0
    }

    /// The latest `end` of any event, or 0 for an empty timeline.
    pub fn duration_ms(&self) -> f64 {
        self.0.iter().map(|v| v.end).fold(0.0, f64::max)
    }

    /// The event active at `elapsed_ms`.
    ///
    /// Overlapping events resolve to the first match in timeline order. `None` is a gap,
    /// which includes any instant after the last event.
    pub fn active_at(&self, elapsed_ms: f64) -> Option<&VisemeEvent> {
        self.0.iter().find(|v| v.contains(elapsed_ms))
    }
}

impl Deref for VisemeTimeline {
    type Target = [VisemeEvent];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<VisemeEvent>> for VisemeTimeline {
    fn from(value: Vec<VisemeEvent>) -> Self {
        Self(value)
    }
}

impl<'a> IntoIterator for &'a VisemeTimeline {
    type Item = &'a VisemeEvent;
    type IntoIter = std::slice::Iter<'a, VisemeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
