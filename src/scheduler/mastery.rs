use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::CYCLE_DAYS;
use super::normalize_word;

#[derive(Debug, Error, PartialEq)]
pub enum MasteryError {
    #[error("cycle day must be between 1 and 3, got {0}")]
    InvalidDay(u32),
    #[error("word not initialized for user: {0}")]
    UnknownWord(String),
}

/// Similarity scores are stored in [0, 1]; NaN counts as 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

fn day_slot(day: u32) -> Result<usize, MasteryError> {
    if (1..=CYCLE_DAYS).contains(&day) {
        Ok((day - 1) as usize)
    } else {
        Err(MasteryError::InvalidDay(day))
    }
}

/// One recorded score per cycle day. Re-submitting a day overwrites it; days
/// never submitted contribute 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriDayScore {
    pub days: [f64; 3],
}

impl TriDayScore {
    pub fn total(&self) -> f64 {
        self.days.iter().sum()
    }

    pub fn record(&mut self, day: u32, score: f64) -> Result<f64, MasteryError> {
        let slot = day_slot(day)?;
        self.days[slot] = clamp_score(score);
        Ok(self.total())
    }
}

/// Long-lived per-user tri-day totals, the server side of score submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasteryTracker {
    words: BTreeMap<String, TriDayScore>,
}

impl MasteryTracker {
    /// Registers a word; existing scores are left untouched.
    pub fn ensure(&mut self, word: &str) {
        let word = normalize_word(word);
        if !word.is_empty() {
            self.words.entry(word).or_default();
        }
    }

    pub fn get(&self, word: &str) -> Option<&TriDayScore> {
        self.words.get(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Stores `score` for `day` and returns the updated tri-day total.
    pub fn submit(&mut self, word: &str, day: u32, score: f64) -> Result<f64, MasteryError> {
        let key = normalize_word(word);
        let entry = self
            .words
            .get_mut(&key)
            .ok_or_else(|| MasteryError::UnknownWord(key.clone()))?;
        entry.record(day, score)
    }

    pub fn total(&self, word: &str) -> Option<f64> {
        self.get(word).map(TriDayScore::total)
    }

    pub fn strong_words(&self, threshold: f64) -> HashSet<String> {
        self.words
            .iter()
            .filter(|(_, score)| score.total() >= threshold)
            .map(|(word, _)| word.clone())
            .collect()
    }

    pub fn strong_count(&self, threshold: f64) -> usize {
        self.words
            .values()
            .filter(|score| score.total() >= threshold)
            .count()
    }
}

/// Best similarity per word and cycle day within the running cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleProgress {
    best: BTreeMap<String, [f64; 3]>,
}

impl CycleProgress {
    /// Keeps `similarity` only if it beats the stored value for that day.
    /// Returns whether anything changed.
    pub fn record(&mut self, word: &str, day: u32, similarity: f64) -> Result<bool, MasteryError> {
        let slot = day_slot(day)?;
        let word = normalize_word(word);
        let similarity = clamp_score(similarity);
        let days = self.best.entry(word).or_default();
        if similarity > days[slot] {
            days[slot] = similarity;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Normalized progress in [0, 100].
    pub fn progress(&self, word: &str) -> f64 {
        self.best
            .get(&normalize_word(word))
            .map(|days| (days.iter().sum::<f64>() * 100.0 / f64::from(CYCLE_DAYS)).min(100.0))
            .unwrap_or(0.0)
    }

    pub fn scores_for<'a, I>(&self, words: I) -> Vec<(String, f64)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        words
            .into_iter()
            .map(|word| (word.clone(), self.progress(word)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.best.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }
}
