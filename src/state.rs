use std::sync::Arc;
use std::time::{Instant, SystemTime};

use thiserror::Error;

use crate::config::{Config, StoreBackend};
use crate::scheduler::SystemClock;
use crate::services::{
    DisabledSimilarity, HttpSimilarity, JsonVocabulary, LearningService, SimilarityService,
    VocabError,
};
use crate::services::similarity::SimilarityError;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("vocabulary unavailable: {0}")]
    Vocabulary(#[from] VocabError),
    #[error("similarity client unavailable: {0}")]
    Similarity(#[from] SimilarityError),
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    service: Arc<LearningService>,
}

impl AppState {
    pub fn new(config: Config, service: LearningService) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            service: Arc::new(service),
        }
    }

    /// Wires the configured store, vocabulary file and similarity client.
    pub fn from_config(config: Config) -> Result<Self, StartupError> {
        let store: Arc<dyn KeyValueStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.sqlite_path)?),
        };

        let vocabulary = Arc::new(JsonVocabulary::from_path(&config.vocab_path)?);

        let similarity: Arc<dyn SimilarityService> = match config.similarity_endpoint.as_deref() {
            Some(endpoint) => Arc::new(HttpSimilarity::new(endpoint, config.similarity_timeout)?),
            None => {
                tracing::warn!("SIMILARITY_ENDPOINT not set; only exact answers will score");
                Arc::new(DisabledSimilarity)
            }
        };

        tracing::info!(
            store = config.store_backend.as_str(),
            desktop_mode = config.desktop_mode,
            "application state ready"
        );

        let service = LearningService::new(
            store,
            vocabulary,
            similarity,
            Arc::new(SystemClock),
            config.scheduler.clone(),
        );
        Ok(Self::new(config, service))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<LearningService> {
        Arc::clone(&self.service)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
