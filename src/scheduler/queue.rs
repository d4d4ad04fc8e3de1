use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize_word;

pub const QUEUE_CAP: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueItem {
    pub word: String,
    pub ready_at_batch: u64,
    /// Milliseconds since the Unix epoch.
    pub added_at: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("review queue word must not be empty")]
    EmptyWord,
}

/// Review queue kept sorted by `(ready_at_batch, added_at)`, unique by word and
/// capped at `cap` entries after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQueue {
    items: Vec<ReviewQueueItem>,
    cap: usize,
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAP)
    }
}

impl ReviewQueue {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap,
        }
    }

    /// Rebuilds a queue from persisted items. Duplicates collapse onto the
    /// earliest eligibility and the oldest `added_at`.
    pub fn from_items(items: Vec<ReviewQueueItem>, cap: usize) -> Self {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());
        let mut merged: Vec<ReviewQueueItem> = Vec::with_capacity(items.len());

        for item in items {
            let word = normalize_word(&item.word);
            if word.is_empty() {
                continue;
            }
            match index.get(&word) {
                Some(&pos) => {
                    let existing = &mut merged[pos];
                    existing.ready_at_batch = existing.ready_at_batch.min(item.ready_at_batch);
                    existing.added_at = existing.added_at.min(item.added_at);
                }
                None => {
                    index.insert(word.clone(), merged.len());
                    merged.push(ReviewQueueItem { word, ..item });
                }
            }
        }

        let mut queue = Self { items: merged, cap };
        queue.enforce_invariants();
        queue
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ReviewQueueItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ReviewQueueItem> {
        self.items
    }

    pub fn get(&self, word: &str) -> Option<&ReviewQueueItem> {
        let word = normalize_word(word);
        self.items.iter().find(|item| item.word == word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// Inserts or updates `word` with `ready_at_batch = current_batch + delay`.
    /// An existing entry keeps the earlier eligibility and its original
    /// `added_at`. Negative delays clamp to zero.
    pub fn enqueue(
        &mut self,
        word: &str,
        delay: i64,
        current_batch: u64,
        added_at: i64,
    ) -> Result<(), QueueError> {
        let word = normalize_word(word);
        if word.is_empty() {
            return Err(QueueError::EmptyWord);
        }

        let ready_at_batch = current_batch.saturating_add(delay.max(0) as u64);

        match self.items.iter_mut().find(|item| item.word == word) {
            Some(existing) => {
                existing.ready_at_batch = existing.ready_at_batch.min(ready_at_batch);
            }
            None => self.items.push(ReviewQueueItem {
                word,
                ready_at_batch,
                added_at,
            }),
        }

        self.enforce_invariants();
        Ok(())
    }

    /// Removes and returns up to `count` words with
    /// `ready_at_batch <= current_batch`, earliest-eligible and oldest first.
    pub fn take_ready(&mut self, current_batch: u64, count: usize) -> Vec<String> {
        let mut ready = Vec::new();
        let mut remaining = Vec::with_capacity(self.items.len());

        for item in self.items.drain(..) {
            if ready.len() < count && item.ready_at_batch <= current_batch {
                ready.push(item.word);
            } else {
                remaining.push(item);
            }
        }

        self.items = remaining;
        ready
    }

    /// Drops every item whose word is in `words`. Returns how many were removed.
    pub fn remove(&mut self, words: &HashSet<String>) -> usize {
        let targets: HashSet<String> = words.iter().map(|word| normalize_word(word)).collect();
        let before = self.items.len();
        self.items.retain(|item| !targets.contains(&item.word));
        before - self.items.len()
    }

    pub fn ready_count(&self, current_batch: u64) -> usize {
        self.items
            .iter()
            .filter(|item| item.ready_at_batch <= current_batch)
            .count()
    }

    fn enforce_invariants(&mut self) -> usize {
        self.items.sort_by(|a, b| {
            a.ready_at_batch
                .cmp(&b.ready_at_batch)
                .then(a.added_at.cmp(&b.added_at))
        });

        if self.items.len() <= self.cap {
            return 0;
        }

        let dropped = self.items.len() - self.cap;
        self.items.truncate(self.cap);
        tracing::debug!(dropped, cap = self.cap, "review queue overflow trimmed");
        dropped
    }
}
