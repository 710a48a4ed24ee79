// Core phonetic types: stress levels, phones, syllables, syllabifications.
//
// The type hierarchy is:
// - `Stress`: ARPABET stress digit (0 unstressed, 1 primary, 2 secondary)
// - `Phone`: a phone symbol plus its roundness score once resolved
// - `Syllable`: stress level and ordered phones
// - `Syllabification`: a word and its ordered syllables
//
// A freshly parsed `Phone` has no score. Scores are filled in by
// `PhoneScoreTable::bake()` and are then carried by value: the cache stores
// them, and everything downstream of the cache reads them from the phone,
// never from the live score table.
//
// Word keys are case-normalized (`normalize_key`) when stored. Corpus tokens
// additionally lose ASCII punctuation (`normalize_token`) before lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LexiconError;

/// Stress level of a syllable, restricted to the ARPABET digits 0, 1, 2.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stress(u8);

/// Returned when a stress level outside 0..=2 is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stress level must be 0, 1, or 2 (got {0})")]
pub struct InvalidStress(pub u8);

impl Stress {
    pub const UNSTRESSED: Stress = Stress(0);
    pub const PRIMARY: Stress = Stress(1);
    pub const SECONDARY: Stress = Stress(2);

    /// The raw stress digit.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Parse a trailing stress digit from a phone token.
    pub fn from_digit(c: char) -> Option<Stress> {
        let digit = c.to_digit(10)?;
        u8::try_from(digit).ok().and_then(|d| Stress::try_from(d).ok())
    }

    /// Score multiplier: `2^stress`.
    pub fn weight(self) -> f64 {
        f64::from(1u32 << self.0)
    }
}

impl TryFrom<u8> for Stress {
    type Error = InvalidStress;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if level <= 2 {
            Ok(Stress(level))
        } else {
            Err(InvalidStress(level))
        }
    }
}

impl From<Stress> for u8 {
    fn from(stress: Stress) -> u8 {
        stress.0
    }
}

/// Score of a syllable: the sum of its phone scores scaled by `2^stress`.
///
/// The empty list scores 0.
pub fn score_syllable(stress: Stress, phone_scores: &[f64]) -> f64 {
    phone_scores.iter().fold(0.0, |acc, s| acc + s) * stress.weight()
}

/// A single phone symbol (e.g. `AE`, `K`) with its resolved roundness score.
#[derive(Debug, Clone, PartialEq)]
pub struct Phone {
    pub symbol: String,
    /// `None` until baked against a `PhoneScoreTable`.
    pub score: Option<f64>,
}

impl Phone {
    /// An unscored phone, as produced by the lexicon parser.
    pub fn new(symbol: impl Into<String>) -> Self {
        Phone {
            symbol: symbol.into(),
            score: None,
        }
    }

    /// A phone with its score already resolved.
    pub fn scored(symbol: impl Into<String>, score: f64) -> Self {
        Phone {
            symbol: symbol.into(),
            score: Some(score),
        }
    }

    /// The baked score, or `UnscoredPhone` naming `word`.
    pub fn require_score(&self, word: &str) -> Result<f64, LexiconError> {
        self.score.ok_or_else(|| LexiconError::UnscoredPhone {
            word: word.to_string(),
            phone: self.symbol.clone(),
        })
    }
}

/// An ordered group of phones with one stress level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Syllable {
    pub stress: Stress,
    pub phones: Vec<Phone>,
}

impl Syllable {
    pub fn new(stress: Stress, phones: Vec<Phone>) -> Self {
        Syllable { stress, phones }
    }

    /// Phone scores in order; `None` while any phone is unscored.
    pub fn phone_scores(&self) -> Option<Vec<f64>> {
        self.phones.iter().map(|p| p.score).collect()
    }

    /// `score_syllable` over this syllable's phones; `None` if unscored.
    pub fn score(&self) -> Option<f64> {
        self.phone_scores()
            .map(|scores| score_syllable(self.stress, &scores))
    }

    /// Arithmetic mean of the phone scores, 0 for an empty syllable and
    /// `None` if unscored. Stays in the score table's range, which makes it
    /// usable as a roundness factor.
    pub fn mean_score(&self) -> Option<f64> {
        let scores = self.phone_scores()?;
        if scores.is_empty() {
            return Some(0.0);
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Whether every phone carries a score.
    pub fn is_scored(&self) -> bool {
        self.phones.iter().all(|p| p.score.is_some())
    }
}

/// The full ordered decomposition of a word into syllables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Syllabification {
    pub word: String,
    pub syllables: Vec<Syllable>,
}

impl Syllabification {
    pub fn new(word: impl Into<String>, syllables: Vec<Syllable>) -> Self {
        Syllabification {
            word: word.into(),
            syllables,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.syllables.iter().all(Syllable::is_scored)
    }

    /// Fails with `UnscoredPhone` for the first phone without a score.
    pub fn require_scored(&self) -> Result<(), LexiconError> {
        for phone in self.syllables.iter().flat_map(|s| &s.phones) {
            phone.require_score(&self.word)?;
        }
        Ok(())
    }
}

/// Case-normalize a lexicon word into its cache key.
pub fn normalize_key(word: &str) -> String {
    word.trim().to_uppercase()
}

/// Normalize a raw corpus token: drop ASCII punctuation, trim, uppercase.
///
/// Returns an empty string for tokens made entirely of punctuation.
pub fn normalize_token(token: &str) -> String {
    let stripped: String = token.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    normalize_key(&stripped)
}
