//! Turns free text into words, syllable estimates and phonemes.
//!
//! None of this is linguistics. Syllables come from counting vowel clusters and
//! phonemes are single characters plus three digraphs.

use crate::model::Phoneme;

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Lower-case `text`, strip punctuation and split it into words.
///
/// Word characters (alphanumerics and `_`) survive, everything else but whitespace is
/// dropped. Words that end up empty are skipped.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Strip one trailing inflection: `es` or `e` after a consonant other than `l`, or `ed`.
///
/// The consonant goes with it, which does not matter since only vowels are counted.
fn strip_inflection(chars: &[char]) -> &[char] {
    let consonant = |c: char| c != 'l' && !is_vowel(c);

    match chars {
        [rest @ .., c, 'e', 's'] if consonant(*c) => rest,
        [rest @ .., 'e', 'd'] => rest,
        [rest @ .., c, 'e'] if consonant(*c) => rest,
        _ => chars,
    }
}

/// Estimate the number of syllables in a lower-cased word. Always at least 1.
pub fn count_syllables(word: &str) -> usize {
    let chars = word.chars().collect::<Vec<char>>();

    let stem = strip_inflection(&chars);
    let stem = match stem {
        ['y', rest @ ..] => rest,
        _ => stem,
    };

    let mut count = 0;
    let mut in_cluster = false;
    for c in stem {
        let vowel = is_vowel(*c);
        if vowel && !in_cluster {
            count += 1;
        }
        in_cluster = vowel;
    }

    count.max(1)
}

/// Segment a lower-cased word into phonemes, left to right.
///
/// `th`, `ch` and `sh` are consumed greedily as one phoneme each, every other character
/// is its own phoneme.
pub fn word_to_phonemes(word: &str) -> Vec<Phoneme> {
    let chars = word.chars().collect::<Vec<char>>();
    let mut phonemes = Vec::with_capacity(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let digraph = match (chars[i], chars.get(i + 1)) {
            ('t', Some('h')) => Some(Phoneme::Th),
            ('c', Some('h')) => Some(Phoneme::Ch),
            ('s', Some('h')) => Some(Phoneme::Sh),
            _ => None,
        };

        match digraph {
            Some(v) => {
                phonemes.push(v);
                i += 2;
            }
            None => {
                phonemes.push(Phoneme::Letter(chars[i]));
                i += 1;
            }
        }
    }

    phonemes
}
