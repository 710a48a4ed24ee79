// Pronunciation lexicon parser.
//
// Reads the syllabified CMU dictionary format:
//
//   ## comment lines start with a double hash
//   ABANDON  AH0 - B AE1 N - D AH0 N
//
// A data line is the word, a double space, then syllables separated by
// ` - `. Within a syllable, phones are separated by whitespace, and a phone
// token ending in a digit carries the syllable's stress (the digit is
// stripped from the symbol). A syllable without a stress-bearing token keeps
// stress 0.
//
// The parser produces unscored phones. `PhoneScoreTable::bake()` resolves
// scores later, when the cache is built.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LexiconError;
use crate::types::{Phone, Stress, Syllabification, Syllable};

/// Lines beginning with this marker are skipped.
pub const COMMENT_MARKER: &str = "##";

/// Separates the word from its syllable description.
pub const WORD_SEPARATOR: &str = "  ";

/// Separates syllables within a description.
pub const SYLLABLE_DELIMITER: &str = " - ";

/// A parsed pronunciation lexicon, preserving source order.
///
/// Duplicate words are kept as separate entries; the cache decides whether a
/// duplicate is a conflict.
#[derive(Debug, Clone, Default)]
pub struct RawLexicon {
    entries: Vec<Syllabification>,
    index: BTreeMap<String, usize>,
}

impl RawLexicon {
    /// All entries in source order.
    pub fn entries(&self) -> &[Syllabification] {
        &self.entries
    }

    /// The first entry for `word` (exact match).
    pub fn get(&self, word: &str) -> Option<&Syllabification> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: Syllabification) {
        self.index.entry(entry.word.clone()).or_insert(self.entries.len());
        self.entries.push(entry);
    }
}

/// Parse a whole lexicon source.
pub fn parse_lexicon(source: &str) -> Result<RawLexicon, LexiconError> {
    let mut lexicon = RawLexicon::default();
    for (idx, line) in source.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        lexicon.push(parse_lexicon_line(line, idx + 1)?);
    }
    Ok(lexicon)
}

/// Read and parse a lexicon file.
pub fn load_lexicon(path: &Path) -> Result<RawLexicon, LexiconError> {
    let source = std::fs::read_to_string(path)?;
    let lexicon = parse_lexicon(&source)?;
    log::info!("parsed {} lexicon entries from {}", lexicon.len(), path.display());
    Ok(lexicon)
}

/// Parse one data line. `line_no` is 1-based and only used in errors.
pub fn parse_lexicon_line(line: &str, line_no: usize) -> Result<Syllabification, LexiconError> {
    let malformed = |reason: &'static str| LexiconError::MalformedLexiconLine {
        line: line_no,
        content: line.to_string(),
        reason,
    };

    let (word, description) = line
        .split_once(WORD_SEPARATOR)
        .ok_or_else(|| malformed("missing double-space separator"))?;
    let description = description.trim();
    if word.is_empty() || word.contains(char::is_whitespace) {
        return Err(malformed("word is empty or contains whitespace"));
    }
    if description.is_empty() {
        return Err(malformed("empty syllable description"));
    }

    let syllables = description
        .split(SYLLABLE_DELIMITER)
        .map(parse_syllable)
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;

    Ok(Syllabification::new(word, syllables))
}

/// Parse one syllable's phone tokens.
fn parse_syllable(part: &str) -> Result<Syllable, &'static str> {
    let mut stress = Stress::UNSTRESSED;
    let mut phones = Vec::new();
    for token in part.split_whitespace() {
        let symbol = match token.chars().last() {
            Some(last) if last.is_ascii_digit() => {
                stress = Stress::from_digit(last).ok_or("stress digit must be 0, 1, or 2")?;
                &token[..token.len() - 1]
            }
            _ => token,
        };
        if symbol.is_empty() || symbol.chars().any(|c| c.is_ascii_digit()) {
            return Err("phone symbol is empty or contains digits");
        }
        phones.push(Phone::new(symbol));
    }
    Ok(Syllable::new(stress, phones))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(syl: &Syllable) -> Vec<&str> {
        syl.phones.iter().map(|p| p.symbol.as_str()).collect()
    }

    #[test]
    fn test_single_syllable() {
        let entry = parse_lexicon_line("CAT  K AE1 T", 1).unwrap();
        assert_eq!(entry.word, "CAT");
        assert_eq!(entry.syllables.len(), 1);
        assert_eq!(entry.syllables[0].stress, Stress::PRIMARY);
        assert_eq!(symbols(&entry.syllables[0]), vec!["K", "AE", "T"]);
        assert!(entry.syllables[0].phones.iter().all(|p| p.score.is_none()));
    }

    #[test]
    fn test_multi_syllable_stress_per_syllable() {
        let entry = parse_lexicon_line("ABANDON  AH0 - B AE1 N - D AH2 N", 1).unwrap();
        assert_eq!(entry.syllables.len(), 3);
        assert_eq!(entry.syllables[0].stress, Stress::UNSTRESSED);
        assert_eq!(entry.syllables[1].stress, Stress::PRIMARY);
        assert_eq!(entry.syllables[2].stress, Stress::SECONDARY);
        assert_eq!(symbols(&entry.syllables[1]), vec!["B", "AE", "N"]);
        assert_eq!(symbols(&entry.syllables[2]), vec!["D", "AH", "N"]);
    }

    #[test]
    fn test_syllable_without_stress_digit_defaults_to_zero() {
        let entry = parse_lexicon_line("HMM  HH M", 1).unwrap();
        assert_eq!(entry.syllables[0].stress, Stress::UNSTRESSED);
        assert_eq!(symbols(&entry.syllables[0]), vec!["HH", "M"]);
    }

    #[test]
    fn test_stress_does_not_leak_between_syllables() {
        let entry = parse_lexicon_line("XY  K AE1 - T", 1).unwrap();
        assert_eq!(entry.syllables[0].stress, Stress::PRIMARY);
        assert_eq!(entry.syllables[1].stress, Stress::UNSTRESSED);
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        match parse_lexicon_line("CAT K AE1 T", 7).unwrap_err() {
            LexiconError::MalformedLexiconLine { line, content, .. } => {
                assert_eq!(line, 7);
                assert_eq!(content, "CAT K AE1 T");
            }
            other => panic!("expected MalformedLexiconLine, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_description_is_malformed() {
        assert!(matches!(
            parse_lexicon_line("CAT  ", 1),
            Err(LexiconError::MalformedLexiconLine { .. })
        ));
        assert!(matches!(
            parse_lexicon_line("  K AE1 T", 1),
            Err(LexiconError::MalformedLexiconLine { .. })
        ));
    }

    #[test]
    fn test_out_of_range_stress_is_malformed() {
        assert!(matches!(
            parse_lexicon_line("CAT  K AE7 T", 1),
            Err(LexiconError::MalformedLexiconLine { .. })
        ));
        assert!(matches!(
            parse_lexicon_line("CAT  K 1 T", 1),
            Err(LexiconError::MalformedLexiconLine { .. })
        ));
    }

    #[test]
    fn test_parse_lexicon_skips_comments_and_blanks() {
        let source = "## header comment\n\nCAT  K AE1 T\n## another\nDOG  D AO1 G\n";
        let lexicon = parse_lexicon(source).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.entries()[0].word, "CAT");
        assert_eq!(lexicon.entries()[1].word, "DOG");
        assert!(lexicon.get("DOG").is_some());
        assert!(lexicon.get("dog").is_none());
    }

    #[test]
    fn test_parse_lexicon_reports_line_number() {
        let source = "## c\nCAT  K AE1 T\nBROKEN\n";
        match parse_lexicon(source).unwrap_err() {
            LexiconError::MalformedLexiconLine { line, .. } => assert_eq!(line, 3),
            other => panic!("expected MalformedLexiconLine, got {other:?}"),
        }
    }

    #[test]
    fn test_every_stress_bearing_symbol_is_digit_free() {
        let source = "ABOUT  AH0 - B AW1 T\nREADY  R EH1 - D IY0\nUNDO  AH2 N - D UW1\n";
        for entry in parse_lexicon(source).unwrap().entries() {
            for syl in &entry.syllables {
                assert!(syl.stress.level() <= 2);
                for phone in &syl.phones {
                    assert!(!phone.symbol.is_empty());
                    assert!(!phone.symbol.chars().any(|c| c.is_ascii_digit()));
                }
            }
        }
    }
}
