//! Text plus speech rate in, timed viseme events out.
//!
//! Generation is a pure function of `(text, speech_rate)` and the [TimingConfig]: the
//! same inputs always produce the same timeline, so a restarted utterance replays the
//! same lip-sync. Nothing here touches shared state, so independent utterances can be
//! generated concurrently.

use std::fmt::Display;

use log::debug;
use rayon::prelude::*;

use crate::{
    config::TimingConfig,
    model::{VisemeEvent, VisemeTimeline},
    text_parser,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Speech rate must be positive and finite.
    InvalidSpeechRate(f32),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSpeechRate(v) => {
                write!(f, "Speech rate must be positive and finite, got {v}")
            }
        }
    }
}

impl std::error::Error for Error {}

type Result<T> = std::result::Result<T, Error>;

/// Generate a timeline with the default timing constants.
pub fn generate_timeline(text: &str, speech_rate: f32) -> Result<VisemeTimeline> {
    TimelineGenerator::default().generate(text, speech_rate)
}

#[derive(Debug, Default, Clone)]
pub struct TimelineGenerator {
    config: TimingConfig,
}

impl TimelineGenerator {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Duration budget for one normalized word (milliseconds).
    pub fn word_duration_ms(&self, word: &str, speech_rate: f32) -> f64 {
        let syllables = text_parser::count_syllables(word) as f64;
        let complexity = (word.chars().count() as f64 / syllables)
            .clamp(self.config.complexity_min, self.config.complexity_max);
        let base_syllable_ms = self.config.base_syllable_ms / f64::from(speech_rate);

        syllables * base_syllable_ms * complexity
    }

    /// Generate the timeline for one utterance.
    ///
    /// Each word gets a duration budget from its syllable estimate, split evenly across
    /// its phonemes. Every event reaches `overlap_fraction` of a phoneme's duration into
    /// its neighbours on both sides, so events overlap and the first one starts before 0.
    /// Words without any word characters contribute nothing.
    pub fn generate(&self, text: &str, speech_rate: f32) -> Result<VisemeTimeline> {
        if !speech_rate.is_finite() || speech_rate <= 0.0 {
            return Err(Error::InvalidSpeechRate(speech_rate));
        }

        let words = text_parser::normalize(text);
        let mut events: Vec<VisemeEvent> = Vec::with_capacity(words.iter().map(|v| v.len()).sum());
        let mut cursor = 0.0;

        for word in words.iter() {
            let phonemes = text_parser::word_to_phonemes(word);
            if phonemes.is_empty() {
                continue;
            }

            let word_duration = self.word_duration_ms(word, speech_rate);
            let phoneme_duration = word_duration / phonemes.len() as f64;
            let overlap = phoneme_duration * self.config.overlap_fraction;

            for (i, phoneme) in phonemes.iter().enumerate() {
                let start = cursor + i as f64 * phoneme_duration - overlap;
                let end = start + phoneme_duration + overlap;
                // A very short phoneme followed by a very long one could otherwise
                // start earlier than its predecessor. Only the start moves, so the
                // event shrinks and the word stays within its budget.
                let start = match events.last() {
                    Some(previous) => start.max(previous.start),
                    None => start,
                };

                events.push(VisemeEvent {
                    viseme: phoneme.viseme(),
                    intensity: phoneme.intensity(),
                    start,
                    end,
                });
            }

            // Advance by the word budget, not by the overlapping phoneme slices
            cursor += word_duration;
        }

        debug!(
            "Generated {} viseme events over {:.1}ms for {} words",
            events.len(),
            cursor,
            words.len()
        );

        Ok(VisemeTimeline::from(events))
    }

    /// Generate timelines for independent utterances in parallel. Output order matches
    /// input order.
    pub fn generate_batch<S>(&self, texts: &[S], speech_rate: f32) -> Result<Vec<VisemeTimeline>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|v| self.generate(v.as_ref(), speech_rate))
            .collect()
    }
}
