use std::sync::Arc;

use vocab_cycle::scheduler::{ManualClock, SchedulerConfig};
use vocab_cycle::services::session::InitRequest;
use vocab_cycle::services::LearningService;
use vocab_cycle::store::{user_key, KeyValueStore, SqliteStore, StateKey, UserStore};

mod common;

fn service_on(store: Arc<SqliteStore>, clock: Arc<ManualClock>) -> LearningService {
    LearningService::new(
        store,
        Arc::new(common::seeded_vocabulary(30)),
        Arc::new(common::StubSimilarity(0.0)),
        clock,
        SchedulerConfig {
            batch_size: 4,
            ..SchedulerConfig::default()
        },
    )
}

#[test]
fn test_open_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.db");
    let store = SqliteStore::open(&path).unwrap();
    store.set("k", "v").unwrap();
    assert!(path.exists());
    assert_eq!(store.db_path(), path.to_string_lossy());
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        let user = UserStore::new(&store, "u1");
        user.save(StateKey::CompletedBatchCount, &12u64).unwrap();
        user.save(StateKey::KnownWords, &vec!["owl", "fox"]).unwrap();
        user.remove(StateKey::KnownWords).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let raw = store
        .get(&user_key("u1", StateKey::CompletedBatchCount))
        .unwrap();
    assert_eq!(raw.as_deref(), Some("12"));
    let user = UserStore::new(&store, "u1");
    assert_eq!(user.load::<Vec<String>>(StateKey::KnownWords).unwrap(), None);
}

#[tokio::test]
async fn test_learner_state_persists_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learners.db");
    let clock = Arc::new(ManualClock::new(common::t0()));

    let words = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let service = service_on(store, clock.clone());
        let view = service
            .init_cycle(
                "persist",
                InitRequest {
                    mode: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        common::answer_batch(&service, "persist", false).await.unwrap();
        view.batches[0].words.clone()
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let service = service_on(store, clock);
    let status = service.status("persist").await.unwrap();
    assert_eq!(status.completed_batch_count, 1);
    assert_eq!(status.queue_len, words.len());
    assert_eq!(status.phase, "ACTIVE");
}
