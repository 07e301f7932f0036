/*!
Speech-driven lip sync for avatar puppets.

Text is turned into a timeline of timed visemes once per utterance
([generator::generate_timeline]). While the speech plays, a
[receivers::lip_sync::LipSync] samples that timeline every frame and eases a puppet's
morph channels toward the mouth shape for the active viseme.
*/

pub mod cli;
pub mod clock;
pub mod config;
pub mod generator;
pub mod logger;
pub mod model;
pub mod puppets;
pub mod receivers;
pub mod sampler;
pub mod text_parser;
pub mod voice;

use std::collections::BTreeMap;

pub use generator::generate_timeline;
pub use logger::Logger;

/// A mapping of various library metadata.
pub fn metadata() -> BTreeMap<&'static str, String> {
    let mut mapping = BTreeMap::new();

    let is_debug = cfg!(debug_assertions);
    mapping.insert("DEBUG", is_debug.to_string());
    mapping.insert("RELEASE", (!is_debug).to_string());

    mapping.insert("VERSION", env!("CARGO_PKG_VERSION").to_string());
    mapping.insert("VERSION_MAJOR", env!("CARGO_PKG_VERSION_MAJOR").to_string());
    mapping.insert("VERSION_MINOR", env!("CARGO_PKG_VERSION_MINOR").to_string());
    mapping.insert("VERSION_PATCH", env!("CARGO_PKG_VERSION_PATCH").to_string());

    mapping.insert("AUTHORS", env!("CARGO_PKG_AUTHORS").to_string());

    mapping
}
