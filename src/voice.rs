//! Picking which synthesized voice speaks.
//!
//! Discovering voices is the speech backend's job. It hands the list over through a
//! [VoiceSource] and [select_voice] decides, so nothing here holds global state.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The voice the avatar was designed around.
pub const DEFAULT_PREFERRED_VOICE: &str =
    "Microsoft Aria Online (Natural) - English (United States)";

/// Substrings that suggest a female voice when the backend reports no gender.
pub const DEFAULT_NAME_HINTS: [&str; 7] =
    ["female", "zira", "susan", "linda", "eva", "jessa", "samantha"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub name: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl VoiceInfo {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            lang: String::new(),
            gender: None,
        }
    }

    pub fn with_lang<S: Into<String>>(mut self, lang: S) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// Anything that can list the voices currently available.
pub trait VoiceSource {
    fn voices(&self) -> Vec<VoiceInfo>;
}

impl VoiceSource for [VoiceInfo] {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.to_vec()
    }
}

impl VoiceSource for Vec<VoiceInfo> {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicePreference {
    /// Used whenever a voice with exactly this name exists.
    pub preferred_name: String,
    /// Lower-case substrings, matched against lower-cased voice names.
    pub name_hints: Vec<String>,
}

impl Default for VoicePreference {
    fn default() -> Self {
        Self {
            preferred_name: DEFAULT_PREFERRED_VOICE.to_string(),
            name_hints: DEFAULT_NAME_HINTS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Why a voice was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Preferred,
    Female,
    NameHint,
    FirstAvailable,
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Preferred => "preferred voice",
            Self::Female => "reported as female",
            Self::NameHint => "name suggests a female voice",
            Self::FirstAvailable => "first available voice",
        })
    }
}

/// Choose a voice from `voices`.
///
/// The exact preferred name wins, then the first voice reported as female, then the
/// first voice whose name contains a hint, then the first voice at all.
pub fn select_voice<'a>(
    voices: &'a [VoiceInfo],
    preference: &VoicePreference,
) -> Option<(&'a VoiceInfo, Reason)> {
    if let Some(v) = voices.iter().find(|v| v.name == preference.preferred_name) {
        return Some((v, Reason::Preferred));
    }

    if let Some(v) = voices.iter().find(|v| v.gender == Some(Gender::Female)) {
        return Some((v, Reason::Female));
    }

    let hinted = voices.iter().find(|v| {
        let name = v.name.to_lowercase();
        preference
            .name_hints
            .iter()
            .any(|hint| !hint.is_empty() && name.contains(&hint.to_lowercase()))
    });
    if let Some(v) = hinted {
        return Some((v, Reason::NameHint));
    }

    voices.first().map(|v| (v, Reason::FirstAvailable))
}

/// Ask `source` for its voices and choose one.
pub fn select_from<S: VoiceSource + ?Sized>(
    source: &S,
    preference: &VoicePreference,
) -> Option<(VoiceInfo, Reason)> {
    let voices = source.voices();

    select_voice(&voices, preference).map(|(v, reason)| (v.clone(), reason))
}
