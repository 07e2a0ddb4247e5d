//! Readability metrics — Flesch–Kincaid grade level and Dale–Chall score.
//!
//! Formulas follow the usual textstat definitions so numbers are comparable
//! with other tooling. Syllables are estimated from vowel groups; familiar
//! words come from the bundled Dale–Chall list, accepting regular
//! inflections of listed words.

use std::collections::HashSet;
use std::sync::LazyLock;

use thiserror::Error;

use crate::text_prep::{split_sentences, words};
use crate::types::{ReadabilityReport, Scores};

static FAMILIAR_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| include_str!("familiar_words.txt").split_whitespace().collect());

/// Suffixes stripped when looking up inflected forms, with the ending that
/// replaces them on the stem.
const INFLECTIONS: &[(&str, &str)] = &[
    ("ies", "y"),
    ("ied", "y"),
    ("ing", ""),
    ("ing", "e"),
    ("est", ""),
    ("es", ""),
    ("ed", ""),
    ("er", ""),
    ("s", ""),
    ("d", ""),
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadabilityError {
    #[error("text has no words to score")]
    NoWords,
}

/// Counts shared by both metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextStats {
    words: usize,
    sentences: usize,
    syllables: usize,
    /// Distinct words not on the familiar list.
    unfamiliar: usize,
}

impl TextStats {
    fn of(text: &str) -> Result<Self, ReadabilityError> {
        let words = words(text);
        if words.is_empty() {
            return Err(ReadabilityError::NoWords);
        }

        let syllables = words.iter().map(|w| syllable_count(w)).sum();
        let unfamiliar = words
            .iter()
            .map(|w| w.to_lowercase().replace('’', "'"))
            .filter(|w| !is_familiar(w))
            .collect::<HashSet<_>>()
            .len();

        Ok(Self {
            words: words.len(),
            sentences: split_sentences(text).len().max(1),
            syllables,
            unfamiliar,
        })
    }

    fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences as f64
    }

    fn fkgl(&self) -> f64 {
        let syllables_per_word = self.syllables as f64 / self.words as f64;
        round2(0.39 * self.words_per_sentence() + 11.8 * syllables_per_word - 15.59)
    }

    fn dale_chall(&self) -> f64 {
        let pct_unfamiliar = self.unfamiliar as f64 / self.words as f64 * 100.0;
        let mut score = 0.1579 * pct_unfamiliar + 0.0496 * self.words_per_sentence();
        if pct_unfamiliar > 5.0 {
            score += 3.6365;
        }
        round2(score)
    }
}

/// Both metrics for one text.
pub fn score(text: &str) -> Result<Scores, ReadabilityError> {
    let stats = TextStats::of(text)?;
    Ok(Scores {
        fkgl: stats.fkgl(),
        dale_chall: stats.dale_chall(),
    })
}

/// Score an original text and its simplified version.
pub fn report(original: &str, simplified: &str) -> Result<ReadabilityReport, ReadabilityError> {
    Ok(ReadabilityReport {
        original: score(original)?,
        simplified: score(simplified)?,
    })
}

/// Estimate the syllables in one word. Never less than one.
pub fn syllable_count(word: &str) -> usize {
    let w: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let n = w.len();
    if n <= 3 {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &w {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let silent_e = w[n - 1] == 'e' && !(w[n - 2] == 'l' && !is_vowel(w[n - 3]));
    let silent_ed = w[n - 2] == 'e' && w[n - 1] == 'd' && !matches!(w[n - 3], 't' | 'd');
    let silent_es = w[n - 2] == 'e'
        && w[n - 1] == 's'
        && !matches!(w[n - 3], 's' | 'x' | 'z' | 'c' | 'g')
        && !(w[n - 3] == 'h' && matches!(w[n - 4], 'c' | 's'));
    if (silent_e || silent_ed || silent_es) && count > 1 {
        count -= 1;
    }

    count.max(1)
}

/// Whether a lowercased word is on the familiar list, directly or as a
/// regular inflection. Numbers count as familiar.
fn is_familiar(word: &str) -> bool {
    if word.chars().all(|c| c.is_ascii_digit()) || FAMILIAR_WORDS.contains(word) {
        return true;
    }
    INFLECTIONS.iter().any(|(suffix, ending)| {
        word.strip_suffix(suffix)
            .filter(|stem| stem.len() >= 2)
            .is_some_and(|stem| FAMILIAR_WORDS.contains(format!("{stem}{ending}").as_str()))
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
