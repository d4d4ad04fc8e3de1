use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use super::similarity::{evaluate_answer, AnswerEvaluation, SimilarityService};
use super::vocabulary::{VocabEntry, VocabError, VocabularyStore};
use crate::scheduler::{
    compose_batch_checked, normalize_word, ActiveCycle, ApplyReport, BatchRequest, BatchVerdict,
    Classification, Clock, CycleBatch, CycleProgress, CycleState, LearnedWords, MasteryError,
    MasteryTracker, QueueError, ReviewQueue, ReviewQueueItem, SchedulerConfig, TransitionError,
    WordMetaTable, WordStatus,
};
use crate::store::{KeyValueStore, StateKey, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active cycle; initialize a new cycle first")]
    NoActiveCycle,
    #[error("a cycle is already active")]
    CycleActive,
    #[error("the cycle has expired; initialize a new cycle")]
    CycleExpired,
    #[error("batch not found: {0}")]
    BatchNotFound(String),
    #[error("word not in batch: {0}")]
    WordNotInBatch(String),
    #[error("no vocabulary words available for level {0}")]
    NoWordsAvailable(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Vocab(#[from] VocabError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Mastery(#[from] MasteryError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub level: String,
    /// Batches per cycle.
    pub mode: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub level: Option<String>,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    pub mode: Option<u32>,
    pub level: Option<String>,
    #[serde(default)]
    pub known_words: Vec<String>,
}

/// Everything persisted for one learner. Loaded whole, mutated, and written
/// back in a single store commit.
#[derive(Debug, Clone)]
pub struct LearnerState {
    pub profile: Profile,
    pub queue: ReviewQueue,
    pub meta: WordMetaTable,
    pub learned: LearnedWords,
    pub known: BTreeSet<String>,
    pub mastery: MasteryTracker,
    pub cycle: CycleState,
    pub progress: CycleProgress,
    pub completed_batch_count: u64,
}

impl LearnerState {
    pub fn load(user: &UserStore<'_>, config: &SchedulerConfig) -> Result<Self, StoreError> {
        let profile = user
            .load::<Profile>(StateKey::Profile)?
            .map(|p| Profile {
                mode: config.clamp_mode(p.mode),
                ..p
            })
            .unwrap_or_else(|| Profile {
                level: config.default_level.clone(),
                mode: config.clamp_mode(config.default_mode),
            });
        let items: Vec<ReviewQueueItem> = user.load_or_default(StateKey::ReviewQueue)?;

        Ok(Self {
            profile,
            queue: ReviewQueue::from_items(items, config.queue_cap),
            meta: user.load_or_default(StateKey::WordMeta)?,
            learned: user.load_or_default(StateKey::LearnedWords)?,
            known: user.load_or_default(StateKey::KnownWords)?,
            mastery: user.load_or_default(StateKey::Mastery)?,
            cycle: user.load_or_default(StateKey::Cycle)?,
            progress: user.load_or_default(StateKey::CycleProgress)?,
            completed_batch_count: user.load_or_default(StateKey::CompletedBatchCount)?,
        })
    }

    pub fn save(&self, user: &UserStore<'_>) -> Result<(), StoreError> {
        let mut batch = user.batch();
        batch.put(StateKey::Profile, &self.profile)?;
        batch.put(StateKey::ReviewQueue, self.queue.items())?;
        batch.put(StateKey::WordMeta, &self.meta)?;
        batch.put(StateKey::LearnedWords, &self.learned)?;
        batch.put(StateKey::KnownWords, &self.known)?;
        batch.put(StateKey::Mastery, &self.mastery)?;
        batch.put(StateKey::Cycle, &self.cycle)?;
        batch.put(StateKey::CycleProgress, &self.progress)?;
        batch.put(StateKey::CompletedBatchCount, &self.completed_batch_count)?;
        user.commit(batch)
    }

    /// Strong, learned and user-known words: never sampled fresh.
    pub fn exclusion_set(&self, strong_total: f64) -> HashSet<String> {
        let mut exclude = self.mastery.strong_words(strong_total);
        exclude.extend(self.learned.iter().cloned());
        exclude.extend(self.known.iter().cloned());
        exclude
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    pub id: Uuid,
    pub index: usize,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleView {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub day: u32,
    pub mode: u32,
    pub level: String,
    pub batches_done: u32,
    pub batches: Vec<BatchView>,
}

impl CycleView {
    fn from_cycle(cycle: &ActiveCycle, now: DateTime<Utc>) -> Self {
        Self {
            cycle_id: cycle.id,
            started_at: cycle.started_at,
            day: cycle.day(now),
            mode: cycle.mode,
            level: cycle.level.clone(),
            batches_done: cycle.batches_done,
            batches: cycle
                .batches
                .iter()
                .enumerate()
                .map(|(index, batch)| BatchView {
                    id: batch.id,
                    index,
                    words: batch.words.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub user_id: String,
    pub level: String,
    pub mode: u32,
    pub phase: &'static str,
    pub day: Option<u32>,
    pub cycle: Option<CycleView>,
    pub queue_len: usize,
    pub ready_count: usize,
    pub completed_batch_count: u64,
    pub learned_count: usize,
    pub strong_count: usize,
    pub known_count: usize,
}

/// The word under the quiz cursor with its hint data. Translations are
/// withheld.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizWord {
    pub batch_id: Uuid,
    pub batch_index: usize,
    pub word_index: usize,
    pub batch_len: usize,
    pub word: String,
    pub day: u32,
    pub example: Option<String>,
    pub partitions: Option<Vec<String>>,
    pub topic: Option<String>,
    /// Per-cycle progress for this word, 0-100.
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutcome {
    pub batch: BatchView,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub classification: Classification,
    pub report: ApplyReport,
    pub verdict: BatchVerdict,
    pub completed_batch_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub word: String,
    pub day: u32,
    pub evaluation: AnswerEvaluation,
    pub tri_day_total: f64,
    pub progress: f64,
    pub batch_finished: Option<BatchSummary>,
    pub next: Option<QuizWord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceDayOutcome {
    pub advanced: bool,
    pub day: u32,
    pub message: &'static str,
}

/// Runs every learner operation against injected collaborators. Calls for the
/// same user are serialized, so each one is an atomic read-modify-write of
/// that user's state.
pub struct LearningService {
    store: Arc<dyn KeyValueStore>,
    vocabulary: Arc<dyn VocabularyStore>,
    similarity: Arc<dyn SimilarityService>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LearningService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        vocabulary: Arc<dyn VocabularyStore>,
        similarity: Arc<dyn SimilarityService>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            vocabulary,
            similarity,
            clock,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Serializes operations per user. Entries nobody holds or waits on are
    /// pruned on the next call, so the map only tracks users in flight.
    async fn lock_user(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    fn user<'a>(&'a self, user_id: &'a str) -> UserStore<'a> {
        UserStore::new(self.store.as_ref(), user_id)
    }

    /// Loads state and applies lazy expiry, persisting it when it fires.
    fn load(&self, user_id: &str, now: DateTime<Utc>) -> SessionResult<(LearnerState, bool)> {
        let user = self.user(user_id);
        let mut state = LearnerState::load(&user, &self.config)?;
        let expired = state.cycle.check_expiry(now);
        if expired {
            state.progress.clear();
            state.save(&user)?;
            tracing::info!(user_id = %user_id, "cycle expired");
        }
        Ok((state, expired))
    }

    fn load_active(&self, user_id: &str, now: DateTime<Utc>) -> SessionResult<LearnerState> {
        let (state, expired) = self.load(user_id, now)?;
        if expired {
            return Err(SessionError::CycleExpired);
        }
        if state.cycle.active().is_none() {
            return Err(SessionError::NoActiveCycle);
        }
        Ok(state)
    }

    fn save(&self, user_id: &str, state: &LearnerState) -> SessionResult<()> {
        state.save(&self.user(user_id))?;
        Ok(())
    }

    fn sample_words(
        &self,
        exclude: &HashSet<String>,
        level: Option<&str>,
        count: usize,
    ) -> Vec<String> {
        self.vocabulary
            .sample(exclude, level, count)
            .into_iter()
            .map(|entry| entry.word)
            .collect()
    }

    pub async fn status(&self, user_id: &str) -> SessionResult<StatusReport> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let (state, _) = self.load(user_id, now)?;
        let active = state.cycle.active();

        Ok(StatusReport {
            user_id: user_id.to_string(),
            level: state.profile.level.clone(),
            mode: state.profile.mode,
            phase: state.cycle.phase().as_str(),
            day: active.map(|cycle| cycle.day(now)),
            cycle: active.map(|cycle| CycleView::from_cycle(cycle, now)),
            queue_len: state.queue.len(),
            ready_count: state.queue.ready_count(state.completed_batch_count),
            completed_batch_count: state.completed_batch_count,
            learned_count: state.learned.len(),
            strong_count: state.mastery.strong_count(self.config.strong_total),
            known_count: state.known.len(),
        })
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> SessionResult<Profile> {
        let _guard = self.lock_user(user_id).await;
        let (mut state, _) = self.load(user_id, self.clock.now())?;

        if let Some(level) = update.level {
            let level = level.trim();
            if level.is_empty() {
                return Err(SessionError::Validation("level must not be empty".to_string()));
            }
            state.profile.level = level.to_lowercase();
        }
        if let Some(mode) = update.mode {
            state.profile.mode = self.config.clamp_mode(mode);
        }

        self.save(user_id, &state)?;
        Ok(state.profile)
    }

    /// Starts a new cycle of `mode` batches. Ready review words go into the
    /// first batches; the rest is sampled fresh.
    pub async fn init_cycle(&self, user_id: &str, request: InitRequest) -> SessionResult<CycleView> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let (mut state, _) = self.load(user_id, now)?;
        if state.cycle.active().is_some() {
            return Err(SessionError::CycleActive);
        }

        if let Some(level) = request.level.as_deref().map(str::trim) {
            if !level.is_empty() {
                state.profile.level = level.to_lowercase();
            }
        }
        if let Some(mode) = request.mode {
            state.profile.mode = self.config.clamp_mode(mode);
        }
        let level = state.profile.level.clone();
        let mode = state.profile.mode;

        state.known.extend(
            request
                .known_words
                .iter()
                .map(|w| normalize_word(w))
                .filter(|w| !w.is_empty()),
        );
        let mut exclude = state.exclusion_set(self.config.strong_total);
        let cooling = state.meta.cooling_down(state.completed_batch_count);

        let mut batches = Vec::with_capacity(mode as usize);
        for _ in 0..mode {
            let composed = {
                let batch_request = BatchRequest {
                    size: self.config.batch_size,
                    exclude: &exclude,
                    cooling: &cooling,
                    level: Some(level.as_str()),
                    current_batch: state.completed_batch_count,
                };
                compose_batch_checked(
                    &mut state.queue,
                    &batch_request,
                    |word| self.vocabulary.contains(word),
                    |blocked, level, count| self.sample_words(blocked, level, count),
                )
            };
            if composed.words.is_empty() {
                break;
            }
            exclude.extend(composed.words.iter().cloned());
            batches.push(CycleBatch::new(composed.words));
        }

        if batches.is_empty() {
            return Err(SessionError::NoWordsAvailable(level));
        }

        for batch in &batches {
            for word in &batch.words {
                state.mastery.ensure(word);
            }
        }
        state.progress.clear();

        let quota = mode.min(batches.len() as u32);
        let cycle = ActiveCycle::new(now, quota, level, batches);
        let view = CycleView::from_cycle(&cycle, now);
        state.cycle.start(cycle)?;
        self.save(user_id, &state)?;
        tracing::info!(
            user_id = %user_id,
            batches = view.batches.len(),
            queue_len = state.queue.len(),
            "cycle initialized"
        );
        Ok(view)
    }

    /// "I already know this": drops `words` from a batch, records them as known
    /// and learned, and refills the batch back to the target size.
    pub async fn replace_known(
        &self,
        user_id: &str,
        batch_id: Uuid,
        words: Vec<String>,
    ) -> SessionResult<ReplaceOutcome> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let mut state = self.load_active(user_id, now)?;

        let remove: HashSet<String> = words
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty())
            .collect();
        if remove.is_empty() {
            return Err(SessionError::Validation("no words to remove".to_string()));
        }

        let current_batch = state.completed_batch_count;
        let strong = state.exclusion_set(self.config.strong_total);
        let cycle = state
            .cycle
            .active_mut()
            .ok_or(SessionError::NoActiveCycle)?;
        let batch_index = cycle
            .batch_position(batch_id)
            .ok_or_else(|| SessionError::BatchNotFound(batch_id.to_string()))?;
        if let Some(missing) = remove
            .iter()
            .find(|w| !cycle.batches[batch_index].words.contains(*w))
        {
            return Err(SessionError::WordNotInBatch(missing.clone()));
        }

        let removed = cycle.remove_from_batch(batch_index, &remove);
        for word in &removed {
            cycle.mark_removed(word);
        }

        let mut exclude = cycle.all_words();
        exclude.extend(strong);
        exclude.extend(removed.iter().cloned());
        let need = self
            .config
            .batch_size
            .saturating_sub(cycle.batches[batch_index].words.len());
        let added: Vec<String> = self
            .sample_words(&exclude, Some(cycle.level.as_str()), need)
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty() && !exclude.contains(w))
            .take(need)
            .collect();
        cycle.batches[batch_index].words.extend(added.iter().cloned());
        let batch = &cycle.batches[batch_index];
        let view = BatchView {
            id: batch.id,
            index: batch_index,
            words: batch.words.clone(),
        };

        let classification = Classification::classify(
            std::iter::empty(),
            removed.iter().map(String::as_str),
            &self.config.thresholds,
        );
        classification.apply(
            &mut state.queue,
            &mut state.meta,
            &mut state.learned,
            current_batch,
            now.timestamp_millis(),
            &self.config.delays,
        )?;
        for word in &removed {
            state.known.insert(word.clone());
            for day in 1..=3 {
                state.progress.record(word, day, 1.0)?;
            }
        }
        for word in &added {
            state.mastery.ensure(word);
        }

        self.save(user_id, &state)?;
        tracing::info!(
            user_id = %user_id,
            removed = removed.len(),
            added = added.len(),
            "known words replaced"
        );
        Ok(ReplaceOutcome {
            batch: view,
            removed,
            added,
        })
    }

    pub async fn select_batch(&self, user_id: &str, batch_index: usize) -> SessionResult<Option<QuizWord>> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let mut state = self.load_active(user_id, now)?;
        let cycle = state
            .cycle
            .active_mut()
            .ok_or(SessionError::NoActiveCycle)?;
        if !cycle.select_batch(batch_index) {
            return Err(SessionError::BatchNotFound(batch_index.to_string()));
        }
        self.save(user_id, &state)?;
        Ok(self.quiz_word(&state, now))
    }

    pub async fn current_word(&self, user_id: &str) -> SessionResult<Option<QuizWord>> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let state = self.load_active(user_id, now)?;
        Ok(self.quiz_word(&state, now))
    }

    fn quiz_word(&self, state: &LearnerState, now: DateTime<Utc>) -> Option<QuizWord> {
        let cycle = state.cycle.active()?;
        let word = cycle.current_word()?;
        let batch = cycle.batches.get(cycle.cursor.batch_index)?;
        let entry = self.vocabulary.lookup(word).ok();

        Some(QuizWord {
            batch_id: batch.id,
            batch_index: cycle.cursor.batch_index,
            word_index: cycle.cursor.word_index,
            batch_len: batch.words.len(),
            word: word.to_string(),
            day: cycle.day(now),
            example: entry.as_ref().and_then(|e| e.example.clone()),
            partitions: entry.as_ref().and_then(|e| e.partitions.clone()),
            topic: entry.and_then(|e| e.topic),
            progress: state.progress.progress(word),
        })
    }

    /// Scores an answer for the word under the cursor and moves on. Finishing
    /// the batch runs classification and the cycle decision.
    pub async fn submit_answer(&self, user_id: &str, answer: &str) -> SessionResult<AnswerOutcome> {
        let _guard = self.lock_user(user_id).await;
        let mut state = self.load_active(user_id, self.clock.now())?;

        let word = state
            .cycle
            .active()
            .and_then(|cycle| cycle.current_word())
            .map(str::to_string)
            .ok_or_else(|| {
                SessionError::Validation("batch has no remaining words; select a batch".to_string())
            })?;

        let evaluation = match self.vocabulary.lookup(&word) {
            Ok(entry) => evaluate_answer(self.similarity.as_ref(), &entry, answer).await,
            Err(err) => {
                tracing::warn!(user_id = %user_id, word = %word, error = %err, "answer scored without vocabulary entry");
                let missing = VocabEntry {
                    word: word.clone(),
                    translations: Vec::new(),
                    example: None,
                    level: None,
                    topic: None,
                    partitions: None,
                };
                evaluate_answer(self.similarity.as_ref(), &missing, answer).await
            }
        };

        let now = self.clock.now();
        if state.cycle.check_expiry(now) {
            state.progress.clear();
            self.save(user_id, &state)?;
            return Err(SessionError::CycleExpired);
        }

        let cycle = state
            .cycle
            .active_mut()
            .ok_or(SessionError::NoActiveCycle)?;
        let day = cycle.day(now);
        let batch_index = cycle.cursor.batch_index;
        let finished = cycle.advance_cursor();

        state.mastery.ensure(&word);
        let tri_day_total = state.mastery.submit(&word, day, evaluation.similarity)?;
        state.progress.record(&word, day, evaluation.similarity)?;
        let progress = state.progress.progress(&word);

        let batch_finished = if finished {
            Some(self.finish_batch(&mut state, batch_index, now)?)
        } else {
            None
        };

        self.save(user_id, &state)?;
        tracing::debug!(
            user_id = %user_id,
            word = %word,
            similarity = evaluation.similarity,
            batch_finished = batch_finished.is_some(),
            "answer recorded"
        );

        Ok(AnswerOutcome {
            next: self.quiz_word(&state, now),
            word,
            day,
            evaluation,
            tri_day_total,
            progress,
            batch_finished,
        })
    }

    fn finish_batch(
        &self,
        state: &mut LearnerState,
        batch_index: usize,
        now: DateTime<Utc>,
    ) -> SessionResult<BatchSummary> {
        let words: Vec<String> = state
            .cycle
            .active()
            .and_then(|cycle| cycle.batches.get(batch_index))
            .map(|batch| batch.words.clone())
            .unwrap_or_default();
        let scores = state.progress.scores_for(&words);

        let classification = Classification::classify(
            scores.iter().map(|(word, score)| (word.as_str(), *score)),
            std::iter::empty(),
            &self.config.thresholds,
        );
        let report = classification.apply(
            &mut state.queue,
            &mut state.meta,
            &mut state.learned,
            state.completed_batch_count,
            now.timestamp_millis(),
            &self.config.delays,
        )?;
        state.completed_batch_count += 1;

        let verdict = state.cycle.complete_batch(now)?;
        if verdict == BatchVerdict::CycleComplete {
            state.progress.clear();
        }

        tracing::info!(
            known = classification.bucket(WordStatus::Known).len(),
            familiar = classification.bucket(WordStatus::Familiar).len(),
            not_quite = classification.bucket(WordStatus::NotQuite).len(),
            new = classification.bucket(WordStatus::New).len(),
            queue_len = state.queue.len(),
            completed_batch_count = state.completed_batch_count,
            ?verdict,
            "batch finished"
        );

        Ok(BatchSummary {
            classification,
            report,
            verdict,
            completed_batch_count: state.completed_batch_count,
        })
    }

    /// Moves the running cycle one day forward by shifting its start back.
    pub async fn advance_day(&self, user_id: &str) -> SessionResult<AdvanceDayOutcome> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let mut state = self.load_active(user_id, now)?;
        let cycle = state
            .cycle
            .active_mut()
            .ok_or(SessionError::NoActiveCycle)?;

        match cycle.shift_start_back_one_day(now) {
            Some(day) => {
                self.save(user_id, &state)?;
                tracing::info!(user_id = %user_id, day, "cycle day advanced");
                Ok(AdvanceDayOutcome {
                    advanced: true,
                    day,
                    message: "Advanced by one day",
                })
            }
            None => Ok(AdvanceDayOutcome {
                advanced: false,
                day: cycle.day(now),
                message: "Cycle is on its last day; initialize a new cycle when it completes",
            }),
        }
    }

    pub async fn learned_words(&self, user_id: &str) -> SessionResult<Vec<String>> {
        let _guard = self.lock_user(user_id).await;
        let state = LearnerState::load(&self.user(user_id), &self.config)?;
        Ok(state.learned.iter().cloned().collect())
    }

    pub fn lookup(&self, word: &str) -> SessionResult<VocabEntry> {
        Ok(self.vocabulary.lookup(word)?)
    }

    pub fn search(&self, query: &str) -> SessionResult<Vec<VocabEntry>> {
        if query.trim().is_empty() {
            return Err(SessionError::Validation("search query must not be empty".to_string()));
        }
        Ok(self.vocabulary.search(query))
    }
}
