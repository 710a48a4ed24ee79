// Corpus structuring and the score grid.
//
// `structure_corpus()` resolves a line-oriented corpus against the lexicon
// cache. Every input line produces exactly one output line, and each output
// line holds the syllabifications of the words that resolved, in order.
// Unresolved words are logged, recorded in `StructuredCorpus::unresolved()`,
// and omitted: a line of nothing but unknown words becomes an empty line,
// never an error.
//
// `ScoreGrid` is the scoring-only view of a structured corpus. Unlike the
// rendering path it needs column alignment, so every word is followed by a
// terminator cell and rows are padded to a common width by `justified()`.
//
// A corpus assembled by hand through `from_lines()` may carry unscored
// phones. The grid and the renderers reject those with `UnscoredPhone`;
// an unscored phone never reads as 0.

use crate::cache::LexiconCache;
use crate::error::LexiconError;
use crate::types::{Stress, Syllabification, normalize_token};

/// A corpus word that had no lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedWord {
    /// 0-based corpus line.
    pub line: usize,
    /// 0-based token position within the line.
    pub position: usize,
    /// The token as it appeared in the corpus.
    pub token: String,
}

/// Corpus lines resolved into syllabifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredCorpus {
    lines: Vec<Vec<Syllabification>>,
    unresolved: Vec<UnresolvedWord>,
}

impl StructuredCorpus {
    /// Build directly from resolved lines (no unresolved words).
    pub fn from_lines(lines: Vec<Vec<Syllabification>>) -> Self {
        StructuredCorpus {
            lines,
            unresolved: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[Vec<Syllabification>] {
        &self.lines
    }

    pub fn unresolved(&self) -> &[UnresolvedWord] {
        &self.unresolved
    }

    /// Fails with `UnscoredPhone` for the first phone without a score.
    pub fn require_scored(&self) -> Result<(), LexiconError> {
        self.lines
            .iter()
            .flatten()
            .try_for_each(Syllabification::require_scored)
    }

    /// Number of resolved words across all lines.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Resolve each corpus line against `cache`.
pub fn structure_lines<'a, I>(lines: I, cache: &LexiconCache) -> StructuredCorpus
where
    I: IntoIterator<Item = &'a str>,
{
    let mut corpus = StructuredCorpus::default();
    for (line_idx, line) in lines.into_iter().enumerate() {
        let mut resolved = Vec::new();
        for (position, token) in line.split_whitespace().enumerate() {
            let word = normalize_token(token);
            if word.is_empty() {
                log::debug!("line {}: skipping punctuation-only token {token:?}", line_idx + 1);
                continue;
            }
            match cache.lookup(&word) {
                Ok(syllabification) => resolved.push(syllabification),
                Err(miss) => {
                    log::warn!("line {}: {miss}", line_idx + 1);
                    corpus.unresolved.push(UnresolvedWord {
                        line: line_idx,
                        position,
                        token: token.to_string(),
                    });
                }
            }
        }
        corpus.lines.push(resolved);
    }
    log::info!(
        "structured {} lines: {} words resolved, {} unresolved",
        corpus.len(),
        corpus.word_count(),
        corpus.unresolved.len()
    );
    corpus
}

/// Resolve a whole corpus text, one entry per line.
pub fn structure_corpus(text: &str, cache: &LexiconCache) -> StructuredCorpus {
    structure_lines(text.lines(), cache)
}

/// Score of the terminator cell appended after each word.
pub const WORD_TERMINATOR_SCORE: f64 = 0.5;

/// One cell of the score grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCell {
    pub score: f64,
    /// Stress of the syllable the phone belongs to, repeated on every phone
    /// of that syllable. The parsed lexicon keeps stress per syllable, not
    /// per phone token, so the stress-bearing phone cannot be singled out.
    pub stress: Stress,
    /// Phone symbol; empty for terminator and padding cells.
    pub symbol: String,
}

impl ScoreCell {
    fn terminator() -> Self {
        ScoreCell {
            score: WORD_TERMINATOR_SCORE,
            stress: Stress::UNSTRESSED,
            symbol: String::new(),
        }
    }

    fn padding() -> Self {
        ScoreCell {
            score: 0.0,
            stress: Stress::UNSTRESSED,
            symbol: String::new(),
        }
    }
}

/// Per-phone scores laid out one row per corpus line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreGrid {
    rows: Vec<Vec<ScoreCell>>,
}

impl ScoreGrid {
    /// Lay out `corpus` one row per line. Fails with `UnscoredPhone` if any
    /// phone has no score.
    pub fn from_corpus(corpus: &StructuredCorpus) -> Result<Self, LexiconError> {
        let mut rows = Vec::with_capacity(corpus.len());
        for line in corpus.lines() {
            let mut row = Vec::new();
            for word in line {
                for syl in &word.syllables {
                    for phone in &syl.phones {
                        row.push(ScoreCell {
                            score: phone.require_score(&word.word)?,
                            stress: syl.stress,
                            symbol: phone.symbol.clone(),
                        });
                    }
                }
                row.push(ScoreCell::terminator());
            }
            rows.push(row);
        }
        Ok(ScoreGrid { rows })
    }

    /// Rows as built, ragged.
    pub fn rows(&self) -> &[Vec<ScoreCell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Rows padded with zero cells to `col_count()`.
    pub fn justified(&self) -> Vec<Vec<ScoreCell>> {
        let cols = self.col_count();
        self.rows
            .iter()
            .map(|row| {
                let mut padded = row.clone();
                padded.resize_with(cols, ScoreCell::padding);
                padded
            })
            .collect()
    }

    /// Justified scores as CSV, one line per corpus line.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in self.justified() {
            let cells: Vec<String> = row.iter().map(|c| c.score.to_string()).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_lexicon;
    use crate::scores::PhoneScoreTable;
    use crate::types::{Phone, Syllable};

    fn cache() -> LexiconCache {
        let table = PhoneScoreTable::parse("K,0.3\nAE,0.49\nT,0.11\nD,0.64\nAO,0.7\nG,0.72").unwrap();
        let lexicon = parse_lexicon("CAT  K AE1 T\nDOG  D AO1 G").unwrap();
        LexiconCache::build(&lexicon, &table).unwrap()
    }

    #[test]
    fn test_punctuation_and_case_folded() {
        let corpus = structure_corpus("cat. cat", &cache());
        assert_eq!(corpus.len(), 1);
        let line = &corpus.lines()[0];
        assert_eq!(line.len(), 2);
        assert_eq!(line[0], line[1]);
        assert_eq!(line[0].word, "CAT");
    }

    #[test]
    fn test_unresolved_words_are_omitted() {
        let corpus = structure_corpus("the cat saw a dog", &cache());
        let words: Vec<&str> = corpus.lines()[0].iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["CAT", "DOG"]);
        let missing: Vec<&str> = corpus.unresolved().iter().map(|u| u.token.as_str()).collect();
        assert_eq!(missing, vec!["the", "saw", "a"]);
        assert_eq!(corpus.unresolved()[1].position, 2);
    }

    #[test]
    fn test_line_of_unknown_words_is_empty_not_error() {
        let corpus = structure_corpus("cat\nxyzzy plugh\ndog", &cache());
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.lines()[0].len(), 1);
        assert!(corpus.lines()[1].is_empty());
        assert_eq!(corpus.lines()[2].len(), 1);
        assert_eq!(corpus.unresolved().len(), 2);
        assert!(corpus.unresolved().iter().all(|u| u.line == 1));
    }

    #[test]
    fn test_blank_lines_preserved() {
        let corpus = structure_corpus("cat\n\ndog\n", &cache());
        assert_eq!(corpus.len(), 3);
        assert!(corpus.lines()[1].is_empty());
    }

    #[test]
    fn test_punctuation_only_token_is_not_unresolved() {
        let corpus = structure_corpus("cat -- dog", &cache());
        assert_eq!(corpus.word_count(), 2);
        assert!(corpus.unresolved().is_empty());
    }

    #[test]
    fn test_score_grid_terminators_and_padding() {
        let corpus = structure_corpus("cat dog\ncat\nzzz", &cache());
        let grid = ScoreGrid::from_corpus(&corpus).unwrap();
        assert_eq!(grid.row_count(), 3);
        // 3 phones + terminator per word.
        assert_eq!(grid.rows()[0].len(), 8);
        assert_eq!(grid.rows()[1].len(), 4);
        assert!(grid.rows()[2].is_empty());
        assert_eq!(grid.col_count(), 8);

        let row = &grid.rows()[0];
        assert_eq!(row[0].symbol, "K");
        // Every phone of a syllable repeats its stress; terminators are 0.
        assert!(row[..3].iter().all(|c| c.stress == Stress::PRIMARY));
        assert_eq!(row[3].stress, Stress::UNSTRESSED);
        assert_eq!(row[3].score, WORD_TERMINATOR_SCORE);
        assert_eq!(row[3].symbol, "");
        assert_eq!(row[7].score, WORD_TERMINATOR_SCORE);

        let justified = grid.justified();
        assert!(justified.iter().all(|r| r.len() == 8));
        assert_eq!(justified[1][4].score, 0.0);
        assert_eq!(justified[2][0].score, 0.0);
    }

    #[test]
    fn test_score_grid_csv() {
        let corpus = structure_corpus("cat\ndog dog", &cache());
        let csv = ScoreGrid::from_corpus(&corpus).unwrap().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0.3,0.49,0.11,0.5,0,0,0,0");
        assert_eq!(lines[1], "0.64,0.7,0.72,0.5,0.64,0.7,0.72,0.5");
    }

    #[test]
    fn test_score_grid_rejects_unscored_phones() {
        let raw = Syllabification::new(
            "CAT",
            vec![Syllable::new(
                Stress::PRIMARY,
                vec![Phone::new("K"), Phone::new("AE"), Phone::new("T")],
            )],
        );
        let corpus = StructuredCorpus::from_lines(vec![vec![raw]]);
        assert!(matches!(
            corpus.require_scored(),
            Err(LexiconError::UnscoredPhone { .. })
        ));
        match ScoreGrid::from_corpus(&corpus) {
            Err(LexiconError::UnscoredPhone { word, phone }) => {
                assert_eq!(word, "CAT");
                assert_eq!(phone, "K");
            }
            other => panic!("expected UnscoredPhone, got {other:?}"),
        }
    }

    #[test]
    fn test_resolved_corpus_is_scored() {
        let corpus = structure_corpus("cat dog", &cache());
        assert!(corpus.require_scored().is_ok());
    }
}
