// Error taxonomy for lexicon loading, cache persistence, and lookups.
//
// `LexiconError` covers everything that aborts a run: unparseable score rows
// and lexicon lines, phones the score table cannot resolve, key collisions
// while filling a fresh cache, and cache files that fail schema validation.
// `WordNotFound` is a separate type: a lookup miss is an ordinary outcome
// during corpus structuring, not a build error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors from building, persisting, or loading the lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A score table row that is not `SYMBOL,SCORE`.
    #[error("malformed score row {line}: {content:?}")]
    MalformedScoreRow { line: usize, content: String },

    /// A lexicon line that does not split into word and syllable description.
    #[error("malformed lexicon line {line} ({reason}): {content:?}")]
    MalformedLexiconLine {
        line: usize,
        content: String,
        reason: &'static str,
    },

    /// A phone with no entry in the score table. Never defaulted to zero.
    #[error("phone {phone:?} in word {word:?} has no roundness score")]
    UnscoredPhone { word: String, phone: String },

    /// Two lexicon words normalized to the same cache key.
    #[error("cache key {word:?} inserted twice")]
    PersistenceConflict { word: String },

    /// The cache file exists but does not match the stored schema.
    #[error("cache file {} is not a valid lexicon cache: {source}", path.display())]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache file {} has format version {found}, expected {expected}", path.display())]
    CacheVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// A corpus word with no lexicon entry. Recoverable: callers log and skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("word not found in lexicon: {0:?}")]
pub struct WordNotFound(pub String);
