// Persistent word -> syllabification cache with baked phone scores.
//
// The cache is the single source of truth for corpus structuring. It is
// filled once from the raw lexicon and the phone score table, with every
// phone's score baked into the stored value, so later runs need neither the
// raw lexicon nor the score table and historical scores stay fixed even if
// the table changes.
//
// On disk the cache is one JSON document:
//
//   {"version": 1, "entries": {"CAT": [{"stress": 1, "phones":
//     [{"symbol": "K", "score": 0.3}, ...]}], ...}}
//
// The stored schema is explicit (`StoredSyllable`, `StoredPhone`) and
// validated on load: unknown fields, missing scores, and stress levels
// outside 0..=2 all fail the load instead of being tolerated. Writes go to a
// temporary file in the destination directory and are renamed into place,
// so a failed build never leaves a partial cache behind.
//
// Lookups return independent copies; nothing handed out by the cache aliases
// its storage.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::builder::{RawLexicon, load_lexicon};
use crate::error::{LexiconError, WordNotFound};
use crate::scores::PhoneScoreTable;
use crate::types::{Phone, Stress, Syllabification, Syllable, normalize_key};

/// Current on-disk format version.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// A phone as persisted: the score is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredPhone {
    pub symbol: String,
    pub score: f64,
}

/// A syllable as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredSyllable {
    pub stress: Stress,
    pub phones: Vec<StoredPhone>,
}

impl StoredSyllable {
    /// Convert a scored syllable. Fails with `UnscoredPhone` if any phone
    /// has no score.
    pub fn from_syllable(word: &str, syllable: &Syllable) -> Result<Self, LexiconError> {
        let phones = syllable
            .phones
            .iter()
            .map(|p| match p.score {
                Some(score) => Ok(StoredPhone {
                    symbol: p.symbol.clone(),
                    score,
                }),
                None => Err(LexiconError::UnscoredPhone {
                    word: word.to_string(),
                    phone: p.symbol.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StoredSyllable {
            stress: syllable.stress,
            phones,
        })
    }

    pub fn to_syllable(&self) -> Syllable {
        Syllable::new(
            self.stress,
            self.phones
                .iter()
                .map(|p| Phone::scored(p.symbol.clone(), p.score))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheFile {
    version: u32,
    entries: BTreeMap<String, Vec<StoredSyllable>>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    entries: &'a BTreeMap<String, Vec<StoredSyllable>>,
}

/// Where to find the raw inputs when the cache has to be built.
#[derive(Debug, Clone)]
pub struct LexiconSources {
    /// Syllabified pronunciation lexicon.
    pub lexicon: PathBuf,
    /// Phone score table; `None` uses the embedded default table.
    pub scores: Option<PathBuf>,
}

/// The word -> baked syllabification store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexiconCache {
    entries: BTreeMap<String, Vec<StoredSyllable>>,
}

impl LexiconCache {
    /// Bake every lexicon entry against `table` into a fresh cache.
    ///
    /// Fails with `UnscoredPhone` if the table is missing a phone, and with
    /// `PersistenceConflict` if two entries share a normalized key.
    pub fn build(lexicon: &RawLexicon, table: &PhoneScoreTable) -> Result<Self, LexiconError> {
        let mut cache = LexiconCache::default();
        for entry in lexicon.entries() {
            let baked = table.bake(entry)?;
            cache.insert(&baked)?;
        }
        log::info!("baked {} words into the lexicon cache", cache.len());
        Ok(cache)
    }

    /// Insert one scored syllabification under its normalized word.
    pub fn insert(&mut self, syllabification: &Syllabification) -> Result<(), LexiconError> {
        let word = &syllabification.word;
        let stored = syllabification
            .syllables
            .iter()
            .map(|s| StoredSyllable::from_syllable(word, s))
            .collect::<Result<Vec<_>, _>>()?;
        match self.entries.entry(normalize_key(word)) {
            Entry::Occupied(slot) => Err(LexiconError::PersistenceConflict {
                word: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(stored);
                Ok(())
            }
        }
    }

    /// Load an existing cache file, validating its schema.
    pub fn open(path: &Path) -> Result<Self, LexiconError> {
        let data = std::fs::read_to_string(path)?;
        let file: CacheFile =
            serde_json::from_str(&data).map_err(|source| LexiconError::CacheFormat {
                path: path.to_path_buf(),
                source,
            })?;
        if file.version != CACHE_FORMAT_VERSION {
            return Err(LexiconError::CacheVersion {
                path: path.to_path_buf(),
                found: file.version,
                expected: CACHE_FORMAT_VERSION,
            });
        }
        log::info!("opened lexicon cache {} ({} words)", path.display(), file.entries.len());
        Ok(LexiconCache {
            entries: file.entries,
        })
    }

    /// Write the cache atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), LexiconError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file_mut());
            let file = CacheFileRef {
                version: CACHE_FORMAT_VERSION,
                entries: &self.entries,
            };
            serde_json::to_writer(&mut writer, &file).map_err(|source| {
                LexiconError::CacheFormat {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        log::debug!("wrote lexicon cache {}", path.display());
        Ok(())
    }

    /// Open the cache at `cache_path`, building and persisting it from
    /// `sources` first if no cache file exists there.
    pub fn ensure_built(sources: &LexiconSources, cache_path: &Path) -> Result<Self, LexiconError> {
        if cache_path.exists() {
            return Self::open(cache_path);
        }
        log::info!("no lexicon cache at {}, building", cache_path.display());
        let table = match &sources.scores {
            Some(path) => PhoneScoreTable::load(path)?,
            None => PhoneScoreTable::default_table(),
        };
        let lexicon = load_lexicon(&sources.lexicon)?;
        let cache = Self::build(&lexicon, &table)?;
        cache.save(cache_path)?;
        Ok(cache)
    }

    /// Look up a word (case-normalized, exact match otherwise).
    pub fn lookup(&self, word: &str) -> Result<Syllabification, WordNotFound> {
        let key = normalize_key(word);
        match self.entries.get(&key) {
            Some(stored) => Ok(Syllabification::new(
                key,
                stored.iter().map(StoredSyllable::to_syllable).collect(),
            )),
            None => Err(WordNotFound(key)),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&normalize_key(word))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_lexicon;

    fn cat_table() -> PhoneScoreTable {
        PhoneScoreTable::parse("K,0.3\nAE,0.49\nT,0.11\nD,0.64\nAO,0.7\nG,0.72").unwrap()
    }

    fn small_cache() -> LexiconCache {
        let lexicon = parse_lexicon("CAT  K AE1 T\nDOG  D AO1 G\nCATDOG  K AE1 T - D AO2 G").unwrap();
        LexiconCache::build(&lexicon, &cat_table()).unwrap()
    }

    #[test]
    fn test_build_bakes_scores() {
        let cache = small_cache();
        assert_eq!(cache.len(), 3);
        let cat = cache.lookup("CAT").unwrap();
        assert_eq!(cat.syllables.len(), 1);
        assert_eq!(cat.syllables[0].stress, Stress::PRIMARY);
        let expected = (0.3 + 0.49 + 0.11) * 2.0;
        assert!((cat.syllables[0].score().unwrap() - expected).abs() < 1e-12);
        assert!((cat.syllables[0].score().unwrap() - 1.80).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_is_case_normalized() {
        let cache = small_cache();
        assert_eq!(cache.lookup("cat").unwrap(), cache.lookup("CAT").unwrap());
        assert!(cache.contains("Dog"));
    }

    #[test]
    fn test_lookup_miss_is_word_not_found() {
        let cache = small_cache();
        assert_eq!(cache.lookup("bird"), Err(WordNotFound("BIRD".to_string())));
    }

    #[test]
    fn test_duplicate_key_is_persistence_conflict() {
        let lexicon = parse_lexicon("CAT  K AE1 T\nCat  K AE1 T").unwrap();
        match LexiconCache::build(&lexicon, &cat_table()).unwrap_err() {
            LexiconError::PersistenceConflict { word } => assert_eq!(word, "CAT"),
            other => panic!("expected PersistenceConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_phone_score_aborts_build() {
        let lexicon = parse_lexicon("CAT  K AE1 T\nZOO  Z UW1").unwrap();
        assert!(matches!(
            LexiconCache::build(&lexicon, &cat_table()),
            Err(LexiconError::UnscoredPhone { .. })
        ));
    }

    #[test]
    fn test_insert_rejects_unscored() {
        let mut cache = LexiconCache::default();
        let raw = parse_lexicon("CAT  K AE1 T").unwrap();
        assert!(matches!(
            cache.insert(&raw.entries()[0]),
            Err(LexiconError::UnscoredPhone { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = small_cache();
        cache.save(&path).unwrap();

        let reopened = LexiconCache::open(&path).unwrap();
        assert_eq!(reopened, cache);
        let original = cache.lookup("CATDOG").unwrap();
        let restored = reopened.lookup("CATDOG").unwrap();
        assert_eq!(original, restored);
        assert_eq!(restored.syllables[1].stress, Stress::SECONDARY);
        assert_eq!(restored.syllables[1].phone_scores(), Some(vec![0.64, 0.7, 0.72]));
    }

    #[test]
    fn test_stored_schema_shape() {
        let cache = small_cache();
        let json = serde_json::to_value(CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            entries: &cache.entries,
        })
        .unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["entries"]["CAT"][0]["stress"], 1);
        assert_eq!(json["entries"]["CAT"][0]["phones"][0]["symbol"], "K");
        assert_eq!(json["entries"]["CAT"][0]["phones"][0]["score"], 0.3);
    }

    #[test]
    fn test_open_rejects_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        // Legacy ad hoc shape: [[stress, [{phone: score}]]]
        std::fs::write(&path, r#"{"version":1,"entries":{"CAT":[[1,[{"K":0.3}]]]}}"#).unwrap();
        assert!(matches!(LexiconCache::open(&path), Err(LexiconError::CacheFormat { .. })));

        std::fs::write(
            &path,
            r#"{"version":1,"entries":{"CAT":[{"stress":4,"phones":[]}]}}"#,
        )
        .unwrap();
        assert!(matches!(LexiconCache::open(&path), Err(LexiconError::CacheFormat { .. })));

        std::fs::write(
            &path,
            r#"{"version":1,"entries":{"CAT":[{"stress":1,"phones":[{"symbol":"K"}]}]}}"#,
        )
        .unwrap();
        assert!(matches!(LexiconCache::open(&path), Err(LexiconError::CacheFormat { .. })));
    }

    #[test]
    fn test_open_rejects_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"version":99,"entries":{}}"#).unwrap();
        assert!(matches!(
            LexiconCache::open(&path),
            Err(LexiconError::CacheVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_ensure_built_builds_once_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon_path = dir.path().join("lexicon.rep");
        let scores_path = dir.path().join("scores.csv");
        let cache_path = dir.path().join("nested").join("cache.json");
        std::fs::write(&lexicon_path, "## test\nCAT  K AE1 T\n").unwrap();
        std::fs::write(&scores_path, "K,0.3\nAE,0.49\nT,0.11\n").unwrap();

        let sources = LexiconSources {
            lexicon: lexicon_path.clone(),
            scores: Some(scores_path.clone()),
        };
        let built = LexiconCache::ensure_built(&sources, &cache_path).unwrap();
        assert!(cache_path.exists());
        assert!(built.contains("CAT"));

        // Second call must not touch the sources: remove them to prove it.
        std::fs::remove_file(&lexicon_path).unwrap();
        std::fs::remove_file(&scores_path).unwrap();
        let reopened = LexiconCache::ensure_built(&sources, &cache_path).unwrap();
        assert_eq!(reopened, built);
    }

    #[test]
    fn test_ensure_built_failure_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon_path = dir.path().join("lexicon.rep");
        let cache_path = dir.path().join("cache.json");
        std::fs::write(&lexicon_path, "CAT  K AE1 T\nCat  K AE1 T\n").unwrap();
        let sources = LexiconSources {
            lexicon: lexicon_path,
            scores: None,
        };
        assert!(LexiconCache::ensure_built(&sources, &cache_path).is_err());
        assert!(!cache_path.exists());
    }
}
