use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use liblipsync::{
    clock::ManualClock,
    config::{LipSyncConfig, TargetConfig},
    generator::TimelineGenerator,
    model::{MorphChannels, Viseme},
    receivers::{
        lip_sync::{LipSync, Tick},
        Receiver,
    },
    sampler,
};

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..20)
}

/// Long vowel-less words next to short ones, which forces starts to be clamped.
fn clamping_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof!["[bcdfgjklmnpqrvwxz]{20,40}", "[aeiou]{1,2}", "[a-z]{1,8}"],
        1..20,
    )
}

fn face() -> MorphChannels {
    MorphChannels::from_baseline([
        ("mouthOpen", 0.0),
        ("jawOpen", 0.0),
        ("mouthSmileLeft", 0.05),
        ("mouthFunnel", 0.0),
        ("mouthPucker", 0.0),
    ])
}

proptest! {
    #[test]
    fn generation_is_deterministic(text in ".{0,200}", rate in 0.25f32..4.0) {
        let generator = TimelineGenerator::default();

        let first = generator.generate(&text, rate).unwrap();
        let second = generator.generate(&text, rate).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn starts_never_decrease(text in ".{0,200}", rate in 0.25f32..4.0) {
        let timeline = TimelineGenerator::default().generate(&text, rate).unwrap();

        for pair in timeline.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start, "{:?}", pair);
        }
        for event in timeline.iter() {
            prop_assert!(event.start < event.end);
            prop_assert!(event.start.is_finite() && event.end.is_finite());
        }
    }

    #[test]
    fn duration_is_sum_of_word_budgets(words in words(), rate in 0.25f32..4.0) {
        let generator = TimelineGenerator::default();
        let timeline = generator.generate(&words.join(" "), rate).unwrap();

        let expected: f64 = words.iter().map(|v| generator.word_duration_ms(v, rate)).sum();

        prop_assert!((timeline.duration_ms() - expected).abs() <= expected * 1e-9);
        prop_assert!(timeline.len() >= words.len());
    }

    #[test]
    fn clamping_keeps_word_budgets(words in clamping_words(), rate in 0.25f32..4.0) {
        let generator = TimelineGenerator::default();
        let timeline = generator.generate(&words.join(" "), rate).unwrap();

        let expected: f64 = words.iter().map(|v| generator.word_duration_ms(v, rate)).sum();

        prop_assert!((timeline.duration_ms() - expected).abs() <= expected * 1e-9);
        for pair in timeline.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start, "{:?}", pair);
        }
        for event in timeline.iter() {
            prop_assert!(event.start < event.end, "{:?}", event);
        }
    }

    #[test]
    fn punctuation_only_is_empty(text in "[ .,!?;:'\"()-]{0,50}") {
        let timeline = TimelineGenerator::default().generate(&text, 1.0).unwrap();

        prop_assert!(timeline.is_empty());
        prop_assert_eq!(timeline.duration_ms(), 0.0);
    }

    #[test]
    fn sampling_never_fails(words in words(), elapsed in -1000.0f64..20000.0) {
        let timeline = TimelineGenerator::default().generate(&words.join(" "), 1.0).unwrap();
        let sample = sampler::sample(&timeline, elapsed, &TargetConfig::default());

        if elapsed > timeline.duration_ms() {
            prop_assert!(!sample.active);
            prop_assert_eq!(sample.viseme, Viseme::Sil);
        }
        prop_assert!((0.0..=1.2).contains(&sample.intensity));
    }

    #[test]
    fn playback_ends_neutral(words in words(), frame_ms in 5.0f64..100.0, seed in any::<u64>()) {
        let clock = ManualClock::default();
        let mut lip_sync =
            LipSync::with_rng(LipSyncConfig::default(), &clock, StdRng::seed_from_u64(seed));
        let mut channels = face();

        prop_assert!(lip_sync.speak(&words.join(" "), Some(1.0)).unwrap());

        loop {
            match lip_sync.tick(&mut channels) {
                Tick::Speaking(_) => {
                    for (_, v) in channels.iter() {
                        prop_assert!(v.value.is_finite());
                        prop_assert!(v.value >= 0.0);
                    }
                    clock.advance(frame_ms);
                }
                Tick::Finished => break,
                Tick::Idle => prop_assert!(false, "went idle without finishing"),
            }
        }

        for (_, v) in channels.iter() {
            prop_assert_eq!(v.value, v.baseline);
            prop_assert_eq!(v.target, v.baseline);
        }
    }
}
