// Phonetic lexicon crate for phonoglyph.
//
// Turns a syllabified pronunciation dictionary and a phone roundness table
// into a persistent cache of scored syllabifications, and resolves plain-text
// corpora against that cache. No drawing code lives here; the render crate
// consumes `StructuredCorpus`.
//
// Architecture:
// - `types.rs`: `Stress`, `Phone`, `Syllable`, `Syllabification`, key
//   normalization, and `score_syllable()`
// - `scores.rs`: `PhoneScoreTable`: `SYMBOL,SCORE` loader and score baking
// - `builder.rs`: syllabified lexicon parser producing `RawLexicon`
// - `cache.rs`: `LexiconCache`: baked, schema-validated, atomically written
//   JSON store with lazy `ensure_built()`
// - `corpus.rs`: corpus structuring and the column-aligned `ScoreGrid`
// - `error.rs`: fatal `LexiconError` and recoverable `WordNotFound`
//
// Data flow: score table + raw lexicon -> cache -> structured corpus. Every
// component takes its inputs explicitly; there is no global state, and the
// cache is passed to the structurer by reference.

pub mod builder;
pub mod cache;
pub mod corpus;
pub mod error;
pub mod scores;
pub mod types;

// Re-export key types at crate root for convenience.
pub use builder::{RawLexicon, load_lexicon, parse_lexicon};
pub use cache::{LexiconCache, LexiconSources};
pub use corpus::{ScoreGrid, StructuredCorpus, UnresolvedWord, structure_corpus, structure_lines};
pub use error::{LexiconError, WordNotFound};
pub use scores::PhoneScoreTable;
pub use types::{Phone, Stress, Syllabification, Syllable, score_syllable};
