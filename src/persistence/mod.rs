//! Snapshot persistence for the platform state
//!
//! The full [`PlatformState`] is serialized as one JSON document under a
//! fixed storage key. Loading never fails: a missing snapshot yields the
//! seed, and an unreadable or malformed one is logged and replaced by the
//! seed.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::PersistenceError;
use crate::models::PlatformState;

/// Key/value backend holding serialized snapshots
pub trait SnapshotStore: Send + Sync {
    /// Raw snapshot for `key`, `None` if nothing was stored yet
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError>;
}

/// Snapshots stored as `{dir}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError> {
        atomic_write(&self.path_for(key), data.as_bytes())?;
        Ok(())
    }
}

/// Write to `{path}.tmp`, sync, then rename over `path` so a crash
/// mid-write never leaves a truncated snapshot behind.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}

/// In-process backend, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, data: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), data.to_string());
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("snapshot map poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "snapshot store is read-only".to_string(),
            ));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("snapshot map poisoned".to_string()))?;
        entries.insert(key.to_string(), data.to_string());
        Ok(())
    }
}

/// Load the persisted state, falling back to `seed`
pub fn load_state(store: &dyn SnapshotStore, key: &str, seed: &PlatformState) -> PlatformState {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::info!(key = %key, "No persisted snapshot, starting from seed data");
            return seed.clone();
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read snapshot, starting from seed data");
            return seed.clone();
        }
    };

    match serde_json::from_str::<PlatformState>(&raw) {
        Ok(state) => {
            tracing::info!(
                key = %key,
                reports = state.reports.len(),
                transactions = state.reward_transactions.len(),
                "Loaded persisted snapshot"
            );
            state
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Malformed snapshot, starting from seed data");
            seed.clone()
        }
    }
}

/// Serialize the state into the snapshot document
pub fn encode_state(state: &PlatformState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(state)?)
}

pub fn save_state(
    store: &dyn SnapshotStore,
    key: &str,
    state: &PlatformState,
) -> Result<(), PersistenceError> {
    store.save(key, &encode_state(state)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_state;
    use chrono::Utc;

    const KEY: &str = "swp391.platformState.v1";

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "waste_platform_persistence_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_snapshot_yields_seed() {
        let store = MemorySnapshotStore::new();
        let seed = default_state(Utc::now());
        assert_eq!(load_state(&store, KEY, &seed), seed);
    }

    #[test]
    fn test_malformed_snapshot_yields_seed() {
        let store = MemorySnapshotStore::new();
        store.insert_raw(KEY, "{\"citizens\": [1, 2");
        let seed = default_state(Utc::now());
        assert_eq!(load_state(&store, KEY, &seed), seed);
    }

    #[test]
    fn test_unknown_category_is_malformed() {
        let seed = default_state(Utc::now());
        let mut json = serde_json::to_value(&seed).unwrap();
        json["reports"][0]["category"] = serde_json::Value::from("glass");

        let store = MemorySnapshotStore::new();
        store.insert_raw(KEY, &json.to_string());
        assert_eq!(load_state(&store, KEY, &seed), seed);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemorySnapshotStore::new();
        let seed = default_state(Utc::now());
        let mut state = seed.clone();
        state.reports.remove(0);

        save_state(&store, KEY, &state).unwrap();
        assert_eq!(load_state(&store, KEY, &seed), state);
    }

    #[test]
    fn test_snapshot_uses_camel_case_fields() {
        let store = MemorySnapshotStore::new();
        save_state(&store, KEY, &default_state(Utc::now())).unwrap();

        let raw = store.load(KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("rewardRules").is_some());
        assert!(json.get("rewardTransactions").is_some());
        assert_eq!(json["reports"][1]["citizenId"], "user1");
        assert!(json["reports"][0].get("assignedCollectorId").is_none());
    }

    #[test]
    fn test_read_only_store_rejects_saves() {
        let store = MemorySnapshotStore::new();
        store.set_read_only(true);
        let err = save_state(&store, KEY, &default_state(Utc::now())).unwrap_err();
        assert_eq!(err.error_code(), "SNAPSHOT_UNAVAILABLE");
    }

    #[test]
    fn test_file_store_writes_atomically() {
        let dir = test_dir("file_store");
        let store = FileSnapshotStore::new(&dir);
        assert!(store.load(KEY).unwrap().is_none());

        store.save(KEY, "first").unwrap();
        store.save(KEY, "second").unwrap();

        assert_eq!(store.load(KEY).unwrap().as_deref(), Some("second"));
        assert!(store.path_for(KEY).exists());
        assert!(!dir.join(format!("{}.json.tmp", KEY)).exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
