// Phone roundness score table.
//
// Maps ARPABET phone symbols to a scalar "roundness" score loaded from a
// two-column `SYMBOL,SCORE` source. The default table embedded from
// `data/phone_roundness.csv` encodes the heuristic: non-front vowels and
// voiced labials/velars read as round (~0.7), front vowels sit just under
// the midpoint, and voiceless alveolars (S, T, CH) read as spiky (0.11).
//
// There is no defaulting: `score()` fails with `UnscoredPhone` for a symbol
// the table does not know, and `bake()` propagates that failure, so a gap in
// the table aborts a cache build instead of silently zeroing phones.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LexiconError;
use crate::types::{Phone, Syllabification, Syllable};

/// Phone symbol to roundness score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneScoreTable {
    scores: BTreeMap<String, f64>,
}

impl PhoneScoreTable {
    /// Parse `SYMBOL,SCORE` rows. Blank lines are skipped; a repeated symbol
    /// takes the later row's score.
    pub fn parse(source: &str) -> Result<Self, LexiconError> {
        let mut scores = BTreeMap::new();
        for (idx, raw) in source.lines().enumerate() {
            let row = raw.trim();
            if row.is_empty() {
                continue;
            }
            let malformed = || LexiconError::MalformedScoreRow {
                line: idx + 1,
                content: raw.to_string(),
            };
            let (symbol, value) = row.split_once(',').ok_or_else(malformed)?;
            let symbol = symbol.trim();
            if symbol.is_empty() || symbol.contains(char::is_whitespace) {
                return Err(malformed());
            }
            let score: f64 = value.trim().parse().map_err(|_| malformed())?;
            if !score.is_finite() {
                return Err(malformed());
            }
            if let Some(previous) = scores.insert(symbol.to_string(), score) {
                log::debug!("score row {}: {symbol} redefined ({previous} -> {score})", idx + 1);
            }
        }
        Ok(PhoneScoreTable { scores })
    }

    /// Read and parse a score table file.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let source = std::fs::read_to_string(path)?;
        let table = Self::parse(&source)?;
        log::info!("loaded {} phone scores from {}", table.len(), path.display());
        Ok(table)
    }

    /// The roundness table embedded at compile time.
    ///
    /// Panics if the embedded CSV is malformed (caught by the unit tests).
    pub fn default_table() -> Self {
        let source = include_str!("../data/phone_roundness.csv");
        Self::parse(source).expect("embedded phone_roundness.csv is malformed")
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.scores.get(symbol).copied()
    }

    /// Score for `symbol`, failing with `UnscoredPhone` if absent. `word`
    /// only feeds the error message.
    pub fn score(&self, word: &str, symbol: &str) -> Result<f64, LexiconError> {
        self.get(symbol).ok_or_else(|| LexiconError::UnscoredPhone {
            word: word.to_string(),
            phone: symbol.to_string(),
        })
    }

    /// Copy of `syllabification` with every phone's score resolved.
    pub fn bake(&self, syllabification: &Syllabification) -> Result<Syllabification, LexiconError> {
        let syllables = syllabification
            .syllables
            .iter()
            .map(|syl| {
                let phones = syl
                    .phones
                    .iter()
                    .map(|p| {
                        let score = self.score(&syllabification.word, &p.symbol)?;
                        Ok(Phone::scored(p.symbol.clone(), score))
                    })
                    .collect::<Result<Vec<_>, LexiconError>>()?;
                Ok(Syllable::new(syl.stress, phones))
            })
            .collect::<Result<Vec<_>, LexiconError>>()?;
        Ok(Syllabification::new(syllabification.word.clone(), syllables))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stress;

    #[test]
    fn test_parse_rows() {
        let table = PhoneScoreTable::parse("K,0.3\nAE, 0.49\r\n\nT,0.11\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("K"), Some(0.3));
        assert_eq!(table.get("AE"), Some(0.49));
        assert_eq!(table.get("T"), Some(0.11));
        assert_eq!(table.get("ZH"), None);
    }

    #[test]
    fn test_parse_rejects_missing_comma() {
        let err = PhoneScoreTable::parse("K,0.3\nAE 0.49\n").unwrap_err();
        match err {
            LexiconError::MalformedScoreRow { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "AE 0.49");
            }
            other => panic!("expected MalformedScoreRow, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        assert!(matches!(
            PhoneScoreTable::parse("K,round"),
            Err(LexiconError::MalformedScoreRow { line: 1, .. })
        ));
        assert!(matches!(
            PhoneScoreTable::parse("K,NaN"),
            Err(LexiconError::MalformedScoreRow { .. })
        ));
        assert!(matches!(
            PhoneScoreTable::parse(",0.5"),
            Err(LexiconError::MalformedScoreRow { .. })
        ));
    }

    #[test]
    fn test_later_row_wins() {
        let table = PhoneScoreTable::parse("NX,0.72\nNX,0.64").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("NX"), Some(0.64));
    }

    #[test]
    fn test_default_table_loads() {
        let table = PhoneScoreTable::default_table();
        assert!(table.len() >= 45, "expected >= 45 phones, got {}", table.len());
        assert_eq!(table.get("AE"), Some(0.49));
        assert_eq!(table.get("S"), Some(0.11));
        for (symbol, score) in &table.scores {
            assert!((0.0..=1.0).contains(score), "{symbol} score {score} out of range");
        }
    }

    #[test]
    fn test_bake_fills_scores() {
        let table = PhoneScoreTable::parse("K,0.3\nAE,0.49\nT,0.11").unwrap();
        let raw = Syllabification::new(
            "CAT",
            vec![Syllable::new(
                Stress::PRIMARY,
                vec![Phone::new("K"), Phone::new("AE"), Phone::new("T")],
            )],
        );
        let baked = table.bake(&raw).unwrap();
        assert!(baked.is_scored());
        assert_eq!(baked.syllables[0].phone_scores(), Some(vec![0.3, 0.49, 0.11]));
        assert_eq!(baked.syllables[0].stress, Stress::PRIMARY);
        assert!(!raw.is_scored(), "bake must not mutate its input");
    }

    #[test]
    fn test_bake_propagates_unknown_phone() {
        let table = PhoneScoreTable::parse("K,0.3").unwrap();
        let raw = Syllabification::new(
            "KQ",
            vec![Syllable::new(Stress::UNSTRESSED, vec![Phone::new("K"), Phone::new("QQ")])],
        );
        match table.bake(&raw).unwrap_err() {
            LexiconError::UnscoredPhone { word, phone } => {
                assert_eq!(word, "KQ");
                assert_eq!(phone, "QQ");
            }
            other => panic!("expected UnscoredPhone, got {other:?}"),
        }
    }
}
