#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;

use vocab_cycle::config::Config;
use vocab_cycle::scheduler::{ManualClock, SchedulerConfig};
use vocab_cycle::services::session::AnswerOutcome;
use vocab_cycle::services::similarity::SimilarityError;
use vocab_cycle::services::{
    JsonVocabulary, LearningService, SessionError, SimilarityService, VocabEntry,
};
use vocab_cycle::state::AppState;
use vocab_cycle::store::{KeyValueStore, MemoryStore};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 7, 30, 0).unwrap()
}

/// `word000`, `word001`, ... all at beginner level, translated `t0`, `t1`, ...
pub fn seeded_vocabulary(size: usize) -> JsonVocabulary {
    JsonVocabulary::with_seed(
        (0..size).map(|i| VocabEntry {
            word: format!("word{i:03}"),
            translations: vec![format!("t{i}")],
            example: Some(format!("Example sentence {i}.")),
            level: Some("beginner".to_string()),
            topic: None,
            partitions: Some(vec![format!("wo{i}"), "rd".to_string()]),
        }),
        1234,
    )
}

pub fn translation_for(word: &str) -> String {
    let index: usize = word.trim_start_matches("word").parse().unwrap();
    format!("t{index}")
}

/// Returns the same cosine for every pair.
pub struct StubSimilarity(pub f64);

impl SimilarityService for StubSimilarity {
    fn cosine<'a>(
        &'a self,
        _source: &'a str,
        _target: &'a str,
    ) -> BoxFuture<'a, Result<f64, SimilarityError>> {
        let value = self.0;
        async move { Ok(value) }.boxed()
    }
}

pub struct FailingSimilarity;

impl SimilarityService for FailingSimilarity {
    fn cosine<'a>(
        &'a self,
        _source: &'a str,
        _target: &'a str,
    ) -> BoxFuture<'a, Result<f64, SimilarityError>> {
        async { Err(SimilarityError::MissingCosine) }.boxed()
    }
}

pub struct Harness {
    pub service: Arc<LearningService>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
}

pub fn harness(vocab_size: usize, batch_size: usize) -> Harness {
    harness_with(vocab_size, batch_size, Arc::new(StubSimilarity(0.0)))
}

pub fn harness_with(
    vocab_size: usize,
    batch_size: usize,
    similarity: Arc<dyn SimilarityService>,
) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = Arc::new(MemoryStore::new());
    let config = SchedulerConfig {
        batch_size,
        ..SchedulerConfig::default()
    };
    let service = LearningService::new(
        store.clone() as Arc<dyn KeyValueStore>,
        Arc::new(seeded_vocabulary(vocab_size)),
        similarity,
        clock.clone(),
        config,
    );
    Harness {
        service: Arc::new(service),
        clock,
        store,
    }
}

/// Answers every remaining word of the current batch, correctly or with
/// gibberish, and returns the outcome that finished it.
pub async fn answer_batch(
    service: &LearningService,
    user_id: &str,
    correct: bool,
) -> Result<AnswerOutcome, SessionError> {
    loop {
        let word = service
            .current_word(user_id)
            .await?
            .expect("cursor should point at a word")
            .word;
        let answer = if correct {
            translation_for(&word)
        } else {
            "???".to_string()
        };
        let outcome = service.submit_answer(user_id, &answer).await?;
        if outcome.batch_finished.is_some() {
            return Ok(outcome);
        }
    }
}

pub fn test_config(desktop_mode: bool, tokens: &[(&str, &str)]) -> Config {
    let tokens: HashMap<String, String> = tokens
        .iter()
        .map(|(token, user)| (token.to_string(), user.to_string()))
        .collect();
    let mut config = Config::from_lookup(|_| None);
    config.desktop_mode = desktop_mode;
    config.api_tokens = tokens;
    config.scheduler.batch_size = 5;
    config
}

pub fn create_test_app(desktop_mode: bool, tokens: &[(&str, &str)]) -> Router {
    let config = test_config(desktop_mode, tokens);
    let service = LearningService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(seeded_vocabulary(40)),
        Arc::new(StubSimilarity(0.7)),
        Arc::new(ManualClock::new(t0())),
        config.scheduler.clone(),
    );
    vocab_cycle::create_app(AppState::new(config, service))
}
