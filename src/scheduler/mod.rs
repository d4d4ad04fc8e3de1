//! Spaced-repetition core
//!
//! Pure bookkeeping over per-user state; nothing here performs I/O.
//! - `queue`: capped, FIFO-ordered review queue
//! - `composer`: merges ready review words with freshly sampled vocabulary
//! - `classifier`: end-of-batch mastery buckets, word metadata, learned set
//! - `cycle`: 3-day cycle state machine and clock abstraction
//! - `mastery`: tri-day totals and per-cycle progress

pub mod classifier;
pub mod composer;
pub mod config;
pub mod cycle;
pub mod mastery;
pub mod queue;

pub use classifier::{
    ApplyReport, Classification, LearnedWords, WordMeta, WordMetaTable, WordStatus,
};
pub use composer::{compose_batch, compose_batch_checked, BatchRequest, ComposedBatch};
pub use config::SchedulerConfig;
pub use cycle::{
    day_in_cycle, ActiveCycle, BatchVerdict, Clock, CompletionReason, CycleBatch, CyclePhase,
    CycleState, ManualClock, QuizCursor, SystemClock, TransitionError,
};
pub use mastery::{CycleProgress, MasteryError, MasteryTracker, TriDayScore};
pub use queue::{QueueError, ReviewQueue, ReviewQueueItem};

/// Canonical form used for every word comparison.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}
