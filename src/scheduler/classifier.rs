use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::config::{ClassificationThresholds, ReexposureDelays};
use super::normalize_word;
use super::queue::{QueueError, ReviewQueue};

/// Normalized score given to words the learner removed as already known.
pub const REMOVED_WORD_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    Known,
    Familiar,
    NotQuite,
    New,
}

impl WordStatus {
    /// Buckets a normalized 0-100 score. NaN counts as 0.
    pub fn from_score(score: f64, thresholds: &ClassificationThresholds) -> Self {
        let score = if score.is_nan() { 0.0 } else { score };
        if score >= thresholds.known {
            Self::Known
        } else if score >= thresholds.familiar {
            Self::Familiar
        } else if score >= thresholds.not_quite {
            Self::NotQuite
        } else {
            Self::New
        }
    }

    pub fn delay(self, delays: &ReexposureDelays) -> u64 {
        match self {
            Self::Known => delays.known,
            Self::Familiar => delays.familiar,
            Self::NotQuite => delays.not_quite,
            Self::New => delays.new,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::Familiar => "familiar",
            Self::NotQuite => "not_quite",
            Self::New => "new",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMeta {
    pub status: WordStatus,
    pub delay: u64,
    pub last_seen_batch: u64,
}

impl WordMeta {
    pub fn is_due(&self, current_batch: u64) -> bool {
        current_batch.saturating_sub(self.last_seen_batch) >= self.delay
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordMetaTable {
    entries: BTreeMap<String, WordMeta>,
}

impl WordMetaTable {
    pub fn get(&self, word: &str) -> Option<&WordMeta> {
        self.entries.get(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, word: &str, status: WordStatus, delay: u64, batch: u64) {
        self.entries.insert(
            normalize_word(word),
            WordMeta {
                status,
                delay,
                last_seen_batch: batch,
            },
        );
    }

    /// Words that must not be drawn fresh at `current_batch`.
    pub fn cooling_down(&self, current_batch: u64) -> HashSet<String> {
        self.entries
            .iter()
            .filter(|(_, meta)| !meta.is_due(current_batch))
            .map(|(word, _)| word.clone())
            .collect()
    }
}

/// Permanent set of words promoted to learned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnedWords(BTreeSet<String>);

impl LearnedWords {
    /// Returns `false` when the word was already learned.
    pub fn promote(&mut self, word: &str) -> bool {
        let word = normalize_word(word);
        if word.is_empty() {
            return false;
        }
        self.0.insert(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub known: BTreeSet<String>,
    pub familiar: BTreeSet<String>,
    pub not_quite: BTreeSet<String>,
    pub new: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub promoted: usize,
    pub enqueued: usize,
    pub dequeued: usize,
}

impl Classification {
    /// Buckets every scored word. A word scored more than once keeps its best
    /// score; `removed` words skip scoring and land in `known`.
    pub fn classify<'a, S, R>(
        scores: S,
        removed: R,
        thresholds: &ClassificationThresholds,
    ) -> Self
    where
        S: IntoIterator<Item = (&'a str, f64)>,
        R: IntoIterator<Item = &'a str>,
    {
        let mut best: BTreeMap<String, f64> = BTreeMap::new();
        for (word, score) in scores {
            let word = normalize_word(word);
            if word.is_empty() {
                continue;
            }
            let score = if score.is_nan() { 0.0 } else { score };
            let entry = best.entry(word).or_insert(score);
            if score > *entry {
                *entry = score;
            }
        }
        for word in removed {
            let word = normalize_word(word);
            if !word.is_empty() {
                best.insert(word, REMOVED_WORD_SCORE);
            }
        }

        let mut out = Self::default();
        for (word, score) in best {
            match WordStatus::from_score(score, thresholds) {
                WordStatus::Known => out.known.insert(word),
                WordStatus::Familiar => out.familiar.insert(word),
                WordStatus::NotQuite => out.not_quite.insert(word),
                WordStatus::New => out.new.insert(word),
            };
        }
        out
    }

    pub fn bucket(&self, status: WordStatus) -> &BTreeSet<String> {
        match status {
            WordStatus::Known => &self.known,
            WordStatus::Familiar => &self.familiar,
            WordStatus::NotQuite => &self.not_quite,
            WordStatus::New => &self.new,
        }
    }

    pub fn status_of(&self, word: &str) -> Option<WordStatus> {
        let word = normalize_word(word);
        [
            WordStatus::Known,
            WordStatus::Familiar,
            WordStatus::NotQuite,
            WordStatus::New,
        ]
        .into_iter()
        .find(|status| self.bucket(*status).contains(&word))
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.familiar.len() + self.not_quite.len() + self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the outcome into the learner's state: metadata for every word,
    /// known words promoted and pulled from the queue, the rest re-queued with
    /// their bucket delay relative to `current_batch`.
    pub fn apply(
        &self,
        queue: &mut ReviewQueue,
        meta: &mut WordMetaTable,
        learned: &mut LearnedWords,
        current_batch: u64,
        added_at: i64,
        delays: &ReexposureDelays,
    ) -> Result<ApplyReport, QueueError> {
        let mut report = ApplyReport::default();

        for status in [
            WordStatus::Known,
            WordStatus::Familiar,
            WordStatus::NotQuite,
            WordStatus::New,
        ] {
            let delay = status.delay(delays);
            for word in self.bucket(status) {
                meta.record(word, status, delay, current_batch);
            }
        }

        for word in &self.known {
            if learned.promote(word) {
                report.promoted += 1;
            }
        }
        let known: HashSet<String> = self.known.iter().cloned().collect();
        report.dequeued = queue.remove(&known);

        for status in [WordStatus::Familiar, WordStatus::NotQuite, WordStatus::New] {
            let delay = status.delay(delays) as i64;
            for word in self.bucket(status) {
                queue.enqueue(word, delay, current_batch, added_at)?;
                report.enqueued += 1;
            }
        }

        Ok(report)
    }
}
