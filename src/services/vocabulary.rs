use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::normalize_word;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("word not found: {0}")]
    NotFound(String),
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vocabulary file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabEntry {
    pub word: String,
    pub translations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Syllable or morpheme split shown as a hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<Vec<String>>,
}

impl VocabEntry {
    /// Entries without a level are offered at every level.
    pub fn matches_level(&self, level: Option<&str>) -> bool {
        match (level, self.level.as_deref()) {
            (Some(wanted), Some(have)) => wanted.trim().eq_ignore_ascii_case(have.trim()),
            _ => true,
        }
    }
}

/// Read-only word source shared by every learner.
pub trait VocabularyStore: Send + Sync {
    /// Up to `count` entries matching `level` whose normalized word is not in
    /// `exclude`.
    fn sample(&self, exclude: &HashSet<String>, level: Option<&str>, count: usize)
        -> Vec<VocabEntry>;

    fn lookup(&self, word: &str) -> Result<VocabEntry, VocabError>;

    fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_ok()
    }

    /// Entries whose word or any translation contains `query`, ignoring case.
    /// A blank query matches nothing.
    fn search(&self, query: &str) -> Vec<VocabEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "translation")]
    translations: Option<OneOrMany>,
    example: Option<String>,
    level: Option<String>,
    topic: Option<String>,
    partitions: Option<Vec<String>>,
}

/// Vocabulary loaded from a JSON object of `word -> entry`.
pub struct JsonVocabulary {
    entries: BTreeMap<String, VocabEntry>,
    rng: Mutex<StdRng>,
}

impl JsonVocabulary {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VocabError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let vocabulary = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            words = vocabulary.len(),
            "vocabulary loaded"
        );
        Ok(vocabulary)
    }

    pub fn from_json(raw: &str) -> Result<Self, VocabError> {
        let parsed: BTreeMap<String, RawEntry> = serde_json::from_str(raw)?;
        let entries = parsed.into_iter().map(|(word, entry)| {
            let translations = match entry.translations {
                Some(OneOrMany::One(t)) => vec![t],
                Some(OneOrMany::Many(ts)) => ts,
                None => Vec::new(),
            };
            VocabEntry {
                word,
                translations,
                example: entry.example,
                level: entry.level,
                topic: entry.topic,
                partitions: entry.partitions,
            }
        });
        Ok(Self::from_entries(entries, StdRng::from_os_rng()))
    }

    /// Builds a vocabulary with a fixed sampling seed.
    pub fn with_seed<I>(entries: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = VocabEntry>,
    {
        Self::from_entries(entries, StdRng::seed_from_u64(seed))
    }

    fn from_entries<I>(entries: I, rng: StdRng) -> Self
    where
        I: IntoIterator<Item = VocabEntry>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let key = normalize_word(&entry.word);
                (!key.is_empty()).then_some((key, entry))
            })
            .collect();
        Self {
            entries,
            rng: Mutex::new(rng),
        }
    }
}

impl VocabularyStore for JsonVocabulary {
    fn sample(
        &self,
        exclude: &HashSet<String>,
        level: Option<&str>,
        count: usize,
    ) -> Vec<VocabEntry> {
        if count == 0 {
            return Vec::new();
        }
        let mut candidates: Vec<&VocabEntry> = self
            .entries
            .iter()
            .filter(|(key, entry)| !exclude.contains(*key) && entry.matches_level(level))
            .map(|(_, entry)| entry)
            .collect();

        candidates.shuffle(&mut *self.rng.lock());
        candidates.into_iter().take(count).cloned().collect()
    }

    fn lookup(&self, word: &str) -> Result<VocabEntry, VocabError> {
        let key = normalize_word(word);
        self.entries
            .get(&key)
            .cloned()
            .ok_or(VocabError::NotFound(key))
    }

    fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&normalize_word(word))
    }

    fn search(&self, query: &str) -> Vec<VocabEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|(key, entry)| {
                key.contains(&needle)
                    || entry
                        .translations
                        .iter()
                        .any(|t| t.to_lowercase().contains(&needle))
            })
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
