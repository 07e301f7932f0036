use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A coarse mouth shape.
///
/// Visual mouth shapes are coarser than acoustic phonemes, so many phonemes collapse
/// onto the same viseme. Serialized names match the names avatar tooling uses
/// (`PP`, `kk`, `aa`, `sil`, ...).
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viseme {
    /// "p", "b", "m" (lips together).
    PP,
    /// "f", "v" (teeth on lip).
    FF,
    /// "th" (tongue between teeth).
    TH,
    /// "t", "d", "n", "l" (tongue on ridge).
    DD,
    /// "k", "g" (back of tongue).
    #[serde(rename = "kk")]
    KK,
    /// "ch", "j".
    CH,
    /// "s", "z", "sh".
    SS,
    /// "r".
    RR,
    /// "a" as in "father".
    #[serde(rename = "aa")]
    AA,
    E,
    I,
    O,
    U,
    /// Silence, also the fallback for anything unrecognized.
    #[default]
    #[serde(rename = "sil")]
    Sil,
}

impl Viseme {
    pub const ALL: [Viseme; 14] = [
        Viseme::PP,
        Viseme::FF,
        Viseme::TH,
        Viseme::DD,
        Viseme::KK,
        Viseme::CH,
        Viseme::SS,
        Viseme::RR,
        Viseme::AA,
        Viseme::E,
        Viseme::I,
        Viseme::O,
        Viseme::U,
        Viseme::Sil,
    ];

    /// Map a phoneme label to its viseme.
    ///
    /// Accepts both the tokens produced by [crate::text_parser::word_to_phonemes] and
    /// the longer labels TTS engines tend to emit (`ah`, `ee`, `oo`, ...). Labels are
    /// case-sensitive. Anything unrecognized is silence.
    pub fn from_phoneme_label(label: &str) -> Self {
        match label {
            "p" | "b" | "m" | "PP" => Self::PP,
            "f" | "v" | "FF" => Self::FF,
            "TH" | "th" => Self::TH,
            "t" | "d" | "n" | "l" | "DD" => Self::DD,
            "k" | "g" | "kk" => Self::KK,
            "s" | "z" | "SH" | "sh" | "SS" => Self::SS,
            "CH" | "ch" | "j" => Self::CH,
            "r" | "RR" => Self::RR,
            "a" | "ah" | "aa" => Self::AA,
            "e" | "eh" | "E" => Self::E,
            "i" | "ih" | "I" | "ee" => Self::I,
            "o" | "oh" | "O" | "oo" => Self::O,
            "u" | "uh" | "U" => Self::U,
            _ => Self::Sil,
        }
    }

    /// The morph channels this viseme drives on an ARKit-style face rig.
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            Self::PP => &[
                "mouthClose",
                "mouthFunnel",
                "mouthPressLeft",
                "mouthPressRight",
                "mouthPucker",
            ],
            Self::FF => &[
                "mouthFrownLeft",
                "mouthFrownRight",
                "mouthLowerDownLeft",
                "mouthLowerDownRight",
            ],
            Self::TH => &["mouthDimpleLeft", "mouthDimpleRight", "tongueOut", "mouthOpen"],
            Self::DD => &["mouthSmileLeft", "mouthSmileRight", "mouthOpen", "jawOpen"],
            Self::KK => &["mouthOpen", "jawOpen", "jawForward"],
            Self::CH => &["mouthShrugUpper", "mouthShrugLower", "mouthOpen"],
            Self::SS => &[
                "mouthSmileLeft",
                "mouthSmileRight",
                "mouthStretchLeft",
                "mouthStretchRight",
            ],
            Self::RR => &["mouthRollUpper", "mouthRollLower", "mouthOpen"],
            Self::AA => &["mouthOpen", "jawOpen", "mouthSmileLeft", "mouthSmileRight"],
            Self::E => &["mouthSmileLeft", "mouthSmileRight", "mouthOpen", "jawOpen"],
            Self::I => &[
                "mouthSmileLeft",
                "mouthSmileRight",
                "mouthStretchLeft",
                "mouthStretchRight",
            ],
            Self::O => &["mouthFunnel", "mouthPucker", "mouthOpen", "jawOpen"],
            Self::U => &["mouthFunnel", "mouthPucker", "mouthRollUpper", "mouthRollLower"],
            Self::Sil => &[],
        }
    }

    pub fn is_silence(&self) -> bool {
        *self == Self::Sil
    }
}

impl AsRef<str> for Viseme {
    fn as_ref(&self) -> &str {
        match self {
            Self::PP => "PP",
            Self::FF => "FF",
            Self::TH => "TH",
            Self::DD => "DD",
            Self::KK => "kk",
            Self::CH => "CH",
            Self::SS => "SS",
            Self::RR => "RR",
            Self::AA => "aa",
            Self::E => "E",
            Self::I => "I",
            Self::O => "O",
            Self::U => "U",
            Self::Sil => "sil",
        }
    }
}

impl Display for Viseme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Parses the canonical viseme names only. Use [Viseme::from_phoneme_label] for phonemes.
impl FromStr for Viseme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_ref() == s)
            .ok_or_else(|| format!("Unknown viseme: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_visemes() {
        assert_eq!(Viseme::from_phoneme_label("p"), Viseme::PP);
        assert_eq!(Viseme::from_phoneme_label("v"), Viseme::FF);
        assert_eq!(Viseme::from_phoneme_label("l"), Viseme::DD);
        assert_eq!(Viseme::from_phoneme_label("g"), Viseme::KK);
        assert_eq!(Viseme::from_phoneme_label("j"), Viseme::CH);
        assert_eq!(Viseme::from_phoneme_label("a"), Viseme::AA);
        assert_eq!(Viseme::from_phoneme_label("i"), Viseme::I);
    }

    #[test]
    fn digraphs_map_to_visemes() {
        assert_eq!(Viseme::from_phoneme_label("TH"), Viseme::TH);
        assert_eq!(Viseme::from_phoneme_label("CH"), Viseme::CH);
        assert_eq!(Viseme::from_phoneme_label("SH"), Viseme::SS);
    }

    #[test]
    fn long_labels_map_to_visemes() {
        assert_eq!(Viseme::from_phoneme_label("ee"), Viseme::I);
        assert_eq!(Viseme::from_phoneme_label("oo"), Viseme::O);
        assert_eq!(Viseme::from_phoneme_label("uh"), Viseme::U);
    }

    #[test]
    fn unknown_labels_are_silence() {
        for label in ["h", "w", "y", "x", "q", "c", "P", "", "7", "é"] {
            assert_eq!(Viseme::from_phoneme_label(label), Viseme::Sil, "{label}");
        }
        assert_eq!(Viseme::from_phoneme_label(" "), Viseme::Sil);
    }

    #[test]
    fn only_silence_has_no_channels() {
        for viseme in Viseme::ALL {
            assert_eq!(viseme.channels().is_empty(), viseme.is_silence(), "{viseme}");
        }
    }

    #[test]
    fn names_round_trip() {
        for viseme in Viseme::ALL {
            assert_eq!(viseme.to_string().parse::<Viseme>().unwrap(), viseme);
        }
        assert!("AA".parse::<Viseme>().is_err());
    }

    #[test]
    fn serialized_names() {
        assert_eq!(serde_json::to_string(&Viseme::KK).unwrap(), "\"kk\"");
        assert_eq!(serde_json::to_string(&Viseme::Sil).unwrap(), "\"sil\"");
        assert_eq!(
            serde_json::from_str::<Viseme>("\"aa\"").unwrap(),
            Viseme::AA
        );
    }
}
