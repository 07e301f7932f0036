use std::fmt::Display;

use super::Viseme;

/// A heuristic pronunciation unit cut out of a word.
///
/// This is not an IPA phoneme, just a character or one of the three digraphs the
/// segmenter recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phoneme {
    Th,
    Ch,
    Sh,
    Letter(char),
}

impl Phoneme {
    pub fn viseme(&self) -> Viseme {
        match self {
            Self::Th => Viseme::TH,
            Self::Ch => Viseme::CH,
            Self::Sh => Viseme::SS,
            Self::Letter(c) => Viseme::from_phoneme_label(c.encode_utf8(&mut [0u8; 4])),
        }
    }

    /// Mouth-opening strength, classified on the phoneme rather than the viseme.
    pub fn intensity(&self) -> f32 {
        match self {
            Self::Th => intensity_for_label("TH"),
            Self::Ch => intensity_for_label("CH"),
            Self::Sh => intensity_for_label("SH"),
            Self::Letter(c) => intensity_for_label(c.encode_utf8(&mut [0u8; 4])),
        }
    }
}

impl Display for Phoneme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Th => write!(f, "TH"),
            Self::Ch => write!(f, "CH"),
            Self::Sh => write!(f, "SH"),
            Self::Letter(c) => write!(f, "{c}"),
        }
    }
}

/// Intensity tiers for a phoneme label.
///
/// Open vowels are the strongest, then mid vowels, close vowels and the strong
/// consonant group. Everything else gets a small visible movement.
pub fn intensity_for_label(label: &str) -> f32 {
    match label {
        "a" | "aa" | "ah" => 1.2,
        "e" | "E" | "o" | "O" => 1.0,
        "i" | "I" | "u" | "U" => 0.8,
        "PP" | "FF" | "TH" | "DD" | "kk" | "CH" => 0.7,
        _ => 0.5,
    }
}
