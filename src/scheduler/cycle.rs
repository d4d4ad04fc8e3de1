use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::config::CYCLE_DAYS;
use super::normalize_word;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Whole days elapsed since `start`; zero when `now` precedes it.
pub fn elapsed_days(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_days().max(0)
}

/// Day of the cycle, 1..=3.
pub fn day_in_cycle(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    (elapsed_days(start, now) % i64::from(CYCLE_DAYS)) as u32 + 1
}

pub fn has_expired(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    elapsed_days(start, now) >= i64::from(CYCLE_DAYS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    NoCycle,
    Active,
    Completed,
}

impl CyclePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            CyclePhase::NoCycle => "NO_CYCLE",
            CyclePhase::Active => "ACTIVE",
            CyclePhase::Completed => "COMPLETED",
        }
    }

    pub fn can_transition_to(self, target: CyclePhase) -> bool {
        matches!(
            (self, target),
            (CyclePhase::NoCycle, CyclePhase::Active)
                | (CyclePhase::Completed, CyclePhase::Active)
                | (CyclePhase::Active, CyclePhase::Completed)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: CyclePhase, to: CyclePhase },
    #[error("no active cycle")]
    NotActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Finished,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleBatch {
    pub id: Uuid,
    pub words: Vec<String>,
}

impl CycleBatch {
    pub fn new(words: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            words,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCursor {
    pub batch_index: usize,
    pub word_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCycle {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Batch quota for the cycle.
    pub mode: u32,
    pub level: String,
    pub batches: Vec<CycleBatch>,
    pub batches_done: u32,
    pub removed_words: BTreeSet<String>,
    pub cursor: QuizCursor,
}

impl ActiveCycle {
    pub fn new(
        started_at: DateTime<Utc>,
        mode: u32,
        level: String,
        batches: Vec<CycleBatch>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            mode,
            level,
            batches,
            batches_done: 0,
            removed_words: BTreeSet::new(),
            cursor: QuizCursor::default(),
        }
    }

    pub fn day(&self, now: DateTime<Utc>) -> u32 {
        day_in_cycle(self.started_at, now)
    }

    pub fn all_words(&self) -> HashSet<String> {
        self.batches
            .iter()
            .flat_map(|batch| batch.words.iter().cloned())
            .collect()
    }

    pub fn batch_position(&self, batch_id: Uuid) -> Option<usize> {
        self.batches.iter().position(|batch| batch.id == batch_id)
    }

    pub fn current_word(&self) -> Option<&str> {
        self.batches
            .get(self.cursor.batch_index)?
            .words
            .get(self.cursor.word_index)
            .map(String::as_str)
    }

    /// Points the cursor at `batch_index`. Reselecting the current batch keeps
    /// the saved position. Returns `false` for an unknown batch.
    pub fn select_batch(&mut self, batch_index: usize) -> bool {
        if batch_index >= self.batches.len() {
            return false;
        }
        if self.cursor.batch_index != batch_index {
            self.cursor = QuizCursor {
                batch_index,
                word_index: 0,
            };
        }
        true
    }

    /// Moves past the current word. Returns `true` when that finished the batch.
    pub fn advance_cursor(&mut self) -> bool {
        let len = self
            .batches
            .get(self.cursor.batch_index)
            .map_or(0, |batch| batch.words.len());
        self.cursor.word_index += 1;
        self.cursor.word_index >= len
    }

    pub fn mark_removed(&mut self, word: &str) -> bool {
        self.removed_words.insert(normalize_word(word))
    }

    /// Drops `words` from one batch. The cursor keeps pointing at the same
    /// upcoming word. Returns the words that were actually removed, in batch
    /// order.
    pub fn remove_from_batch(&mut self, batch_index: usize, words: &HashSet<String>) -> Vec<String> {
        let cursor_here = self.cursor.batch_index == batch_index;
        let cursor_at = self.cursor.word_index;
        let Some(batch) = self.batches.get_mut(batch_index) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let mut shift = 0;
        let mut kept = Vec::with_capacity(batch.words.len());
        for (pos, word) in batch.words.drain(..).enumerate() {
            if words.contains(&word) {
                if cursor_here && pos < cursor_at {
                    shift += 1;
                }
                removed.push(word);
            } else {
                kept.push(word);
            }
        }
        batch.words = kept;

        if cursor_here {
            self.cursor.word_index = cursor_at - shift;
        }
        removed
    }

    /// Moves the cycle start one day earlier. Only allowed before day 3.
    pub fn shift_start_back_one_day(&mut self, now: DateTime<Utc>) -> Option<u32> {
        let day = self.day(now);
        if day >= CYCLE_DAYS {
            return None;
        }
        self.started_at -= Duration::days(1);
        Some(self.day(now))
    }

    fn rewind_cursor_to(&mut self, batch_index: usize) {
        let batch_index = if self.batches.is_empty() {
            0
        } else {
            batch_index % self.batches.len()
        };
        self.cursor = QuizCursor {
            batch_index,
            word_index: 0,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchVerdict {
    ContinueBatch {
        next_batch: usize,
        batches_done: u32,
        mode: u32,
    },
    DayDone {
        day: u32,
    },
    CycleComplete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    NoCycle,
    Active(ActiveCycle),
    Completed {
        completed_at: DateTime<Utc>,
        reason: CompletionReason,
    },
}

impl CycleState {
    pub fn phase(&self) -> CyclePhase {
        match self {
            CycleState::NoCycle => CyclePhase::NoCycle,
            CycleState::Active(_) => CyclePhase::Active,
            CycleState::Completed { .. } => CyclePhase::Completed,
        }
    }

    pub fn active(&self) -> Option<&ActiveCycle> {
        match self {
            CycleState::Active(cycle) => Some(cycle),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveCycle> {
        match self {
            CycleState::Active(cycle) => Some(cycle),
            _ => None,
        }
    }

    pub fn start(&mut self, cycle: ActiveCycle) -> Result<(), TransitionError> {
        self.ensure_can_transition(CyclePhase::Active)?;
        tracing::info!(
            cycle_id = %cycle.id,
            mode = cycle.mode,
            batches = cycle.batches.len(),
            "cycle started"
        );
        *self = CycleState::Active(cycle);
        Ok(())
    }

    /// Lazily expires an active cycle once three days have elapsed since it
    /// started. Returns `true` when this call performed the transition.
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self
            .active()
            .is_some_and(|cycle| has_expired(cycle.started_at, now));
        if expired {
            self.finish(now, CompletionReason::Expired);
        }
        expired
    }

    /// Counts a finished batch and decides what the learner does next.
    pub fn complete_batch(&mut self, now: DateTime<Utc>) -> Result<BatchVerdict, TransitionError> {
        let cycle = self.active_mut().ok_or(TransitionError::NotActive)?;
        cycle.batches_done = cycle.batches_done.saturating_add(1);
        let day = cycle.day(now);
        let batches_done = cycle.batches_done;

        if batches_done < cycle.mode && day < CYCLE_DAYS {
            let next_batch = batches_done as usize;
            cycle.rewind_cursor_to(next_batch);
            return Ok(BatchVerdict::ContinueBatch {
                next_batch: cycle.cursor.batch_index,
                batches_done,
                mode: cycle.mode,
            });
        }

        if day < CYCLE_DAYS {
            cycle.rewind_cursor_to(batches_done as usize);
            return Ok(BatchVerdict::DayDone { day });
        }

        self.finish(now, CompletionReason::Finished);
        Ok(BatchVerdict::CycleComplete)
    }

    fn finish(&mut self, now: DateTime<Utc>, reason: CompletionReason) {
        if let CycleState::Active(cycle) = self {
            tracing::info!(
                cycle_id = %cycle.id,
                ?reason,
                batches_done = cycle.batches_done,
                "cycle completed"
            );
        }
        *self = CycleState::Completed {
            completed_at: now,
            reason,
        };
    }

    fn ensure_can_transition(&self, target: CyclePhase) -> Result<(), TransitionError> {
        let from = self.phase();
        if from.can_transition_to(target) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to: target })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn cycle(mode: u32, batches: usize) -> ActiveCycle {
        let batches = (0..batches)
            .map(|i| CycleBatch::new(vec![format!("w{i}a"), format!("w{i}b")]))
            .collect();
        ActiveCycle::new(t0(), mode, "beginner".to_string(), batches)
    }

    #[test]
    fn test_day_in_cycle() {
        assert_eq!(day_in_cycle(t0(), t0()), 1);
        assert_eq!(day_in_cycle(t0(), t0() + Duration::hours(23)), 1);
        assert_eq!(day_in_cycle(t0(), t0() + Duration::hours(24)), 2);
        assert_eq!(day_in_cycle(t0(), t0() + Duration::hours(50)), 3);
        assert_eq!(day_in_cycle(t0(), t0() + Duration::days(3)), 1);
        assert_eq!(day_in_cycle(t0(), t0() - Duration::days(2)), 1);
    }

    #[test]
    fn test_expiry() {
        assert!(!has_expired(t0(), t0() + Duration::hours(71)));
        assert!(has_expired(t0(), t0() + Duration::hours(72)));
    }

    #[test]
    fn test_start_requires_inactive_cycle() {
        let mut state = CycleState::default();
        state.start(cycle(2, 2)).unwrap();
        assert_eq!(state.phase(), CyclePhase::Active);

        let err = state.start(cycle(2, 2)).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: CyclePhase::Active,
                to: CyclePhase::Active
            }
        );
    }

    #[test]
    fn test_continue_then_day_done() {
        let mut state = CycleState::default();
        state.start(cycle(2, 2)).unwrap();

        let verdict = state.complete_batch(t0() + Duration::hours(1)).unwrap();
        assert_eq!(
            verdict,
            BatchVerdict::ContinueBatch {
                next_batch: 1,
                batches_done: 1,
                mode: 2
            }
        );
        assert_eq!(state.active().unwrap().cursor.batch_index, 1);

        let verdict = state.complete_batch(t0() + Duration::hours(2)).unwrap();
        assert_eq!(verdict, BatchVerdict::DayDone { day: 1 });
        assert_eq!(state.active().unwrap().cursor.batch_index, 0);
    }

    #[test]
    fn test_day_three_completes_cycle() {
        let mut state = CycleState::default();
        state.start(cycle(3, 3)).unwrap();

        let verdict = state.complete_batch(t0() + Duration::days(2)).unwrap();
        assert_eq!(verdict, BatchVerdict::CycleComplete);
        assert!(matches!(
            state,
            CycleState::Completed {
                reason: CompletionReason::Finished,
                ..
            }
        ));
        assert_eq!(state.complete_batch(t0()), Err(TransitionError::NotActive));

        state.start(cycle(1, 1)).unwrap();
        assert_eq!(state.phase(), CyclePhase::Active);
    }

    #[test]
    fn test_lazy_expiry_forces_completion() {
        let mut state = CycleState::default();
        state.start(cycle(2, 2)).unwrap();

        assert!(!state.check_expiry(t0() + Duration::days(2)));
        assert!(state.check_expiry(t0() + Duration::days(3)));
        assert!(matches!(
            state,
            CycleState::Completed {
                reason: CompletionReason::Expired,
                ..
            }
        ));
        assert!(!state.check_expiry(t0() + Duration::days(4)));
    }

    #[test]
    fn test_cursor_walk_and_reselect() {
        let mut active = cycle(2, 2);
        assert_eq!(active.current_word(), Some("w0a"));
        assert!(!active.advance_cursor());
        assert_eq!(active.current_word(), Some("w0b"));

        assert!(active.select_batch(0));
        assert_eq!(active.current_word(), Some("w0b"));
        assert!(active.select_batch(1));
        assert_eq!(active.current_word(), Some("w1a"));
        assert!(!active.select_batch(7));

        assert!(!active.advance_cursor());
        assert!(active.advance_cursor());
        assert_eq!(active.current_word(), None);
    }

    #[test]
    fn test_remove_from_batch_keeps_cursor_on_next_word() {
        let batches = vec![CycleBatch::new(
            ["a", "b", "c", "d"].iter().map(|w| w.to_string()).collect(),
        )];
        let mut active = ActiveCycle::new(t0(), 1, "beginner".to_string(), batches);
        active.advance_cursor();
        active.advance_cursor();
        assert_eq!(active.current_word(), Some("c"));

        let drop: HashSet<String> = ["a".to_string(), "d".to_string(), "zz".to_string()].into();
        let removed = active.remove_from_batch(0, &drop);
        assert_eq!(removed, vec!["a".to_string(), "d".to_string()]);
        assert_eq!(active.current_word(), Some("c"));
        assert!(active.remove_from_batch(9, &drop).is_empty());
    }

    #[test]
    fn test_shift_start_back_one_day() {
        let mut active = cycle(1, 1);
        assert_eq!(active.shift_start_back_one_day(t0()), Some(2));
        assert_eq!(active.shift_start_back_one_day(t0()), Some(3));
        assert_eq!(active.shift_start_back_one_day(t0()), None);
        assert!(!has_expired(active.started_at, t0()));
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut state = CycleState::default();
        state.start(cycle(2, 1)).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"phase\":\"active\""));
        let back: CycleState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
