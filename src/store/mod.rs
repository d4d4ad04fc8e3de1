//! Key-value persistence for per-user learning state.
//!
//! Every user-scoped value lives under `user:{user_id}:{key}` and is stored as
//! JSON text. Backends only need string get/set/remove plus an atomic
//! multi-key write.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Writes all entries or none of them.
    fn set_many(&self, entries: &[(String, String)]) -> StoreResult<()>;
}

/// Names of the per-user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    ReviewQueue,
    WordMeta,
    LearnedWords,
    KnownWords,
    Mastery,
    Cycle,
    CycleProgress,
    CompletedBatchCount,
    Profile,
}

impl StateKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            StateKey::ReviewQueue => "review_queue",
            StateKey::WordMeta => "word_meta",
            StateKey::LearnedWords => "learned_words",
            StateKey::KnownWords => "known_words",
            StateKey::Mastery => "mastery",
            StateKey::Cycle => "cycle",
            StateKey::CycleProgress => "cycle_progress",
            StateKey::CompletedBatchCount => "completed_batch_count",
            StateKey::Profile => "profile",
        }
    }
}

pub fn user_key(user_id: &str, key: StateKey) -> String {
    format!("user:{}:{}", user_id, key.as_str())
}

/// Typed JSON view over one user's slice of a [`KeyValueStore`].
pub struct UserStore<'a> {
    store: &'a dyn KeyValueStore,
    user_id: &'a str,
}

impl<'a> UserStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: &'a str) -> Self {
        Self { store, user_id }
    }

    pub fn user_id(&self) -> &str {
        self.user_id
    }

    pub fn load<T: DeserializeOwned>(&self, key: StateKey) -> StoreResult<Option<T>> {
        match self.store.get(&user_key(self.user_id, key))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Missing records read as `T::default()`.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: StateKey) -> StoreResult<T> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StateKey, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&user_key(self.user_id, key), &raw)
    }

    pub fn remove(&self, key: StateKey) -> StoreResult<()> {
        self.store.remove(&user_key(self.user_id, key))
    }

    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch {
            user_id: self.user_id,
            entries: Vec::new(),
        }
    }

    pub fn commit(&self, batch: WriteBatch<'_>) -> StoreResult<()> {
        if batch.entries.is_empty() {
            return Ok(());
        }
        self.store.set_many(&batch.entries)
    }
}

/// Collects several record writes for a single atomic commit.
pub struct WriteBatch<'a> {
    user_id: &'a str,
    entries: Vec<(String, String)>,
}

impl WriteBatch<'_> {
    pub fn put<T: Serialize + ?Sized>(&mut self, key: StateKey, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.entries.push((user_key(self.user_id, key), raw));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_scoping() {
        assert_eq!(user_key("u1", StateKey::ReviewQueue), "user:u1:review_queue");
        assert_eq!(
            user_key("local", StateKey::CompletedBatchCount),
            "user:local:completed_batch_count"
        );
    }

    #[test]
    fn test_users_do_not_share_records() {
        let store = MemoryStore::new();
        let alice = UserStore::new(&store, "alice");
        let bob = UserStore::new(&store, "bob");

        alice.save(StateKey::CompletedBatchCount, &7u64).unwrap();
        assert_eq!(alice.load::<u64>(StateKey::CompletedBatchCount).unwrap(), Some(7));
        assert_eq!(bob.load::<u64>(StateKey::CompletedBatchCount).unwrap(), None);
        assert_eq!(bob.load_or_default::<u64>(StateKey::CompletedBatchCount).unwrap(), 0);
    }

    #[test]
    fn test_write_batch_commits_all_entries() {
        let store = MemoryStore::new();
        let user = UserStore::new(&store, "carol");

        let mut batch = user.batch();
        batch.put(StateKey::CompletedBatchCount, &3u64).unwrap();
        batch.put(StateKey::KnownWords, &vec!["sun"]).unwrap();
        assert_eq!(batch.len(), 2);
        user.commit(batch).unwrap();

        assert_eq!(user.load::<u64>(StateKey::CompletedBatchCount).unwrap(), Some(3));
        assert_eq!(
            user.load::<Vec<String>>(StateKey::KnownWords).unwrap(),
            Some(vec!["sun".to_string()])
        );
    }

    #[test]
    fn test_corrupt_record_is_serialization_error() {
        let store = MemoryStore::new();
        store.set(&user_key("dave", StateKey::Profile), "{not json").unwrap();
        let user = UserStore::new(&store, "dave");
        let err = user.load::<u64>(StateKey::Profile).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
