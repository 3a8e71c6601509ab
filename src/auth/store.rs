//! Persisted session state behind a small key-value seam.
//!
//! The guard never touches the filesystem directly; it reads and writes
//! three scalar keys (`token`, `role`, `exp`) through the `StateStore`
//! trait so tests can substitute an in-memory fake.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

/// State file name in the application state directory
const STATE_FILE: &str = "session.json";

/// Minimal key-value interface for persisted session fields.
///
/// The store survives restarts but is not a security boundary; anything
/// running as the same user can read it.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    /// Remove every key. Must be idempotent.
    fn clear(&mut self);
}

/// In-memory store for tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

/// File-backed store, write-through on every mutation.
///
/// Persist failures are logged and otherwise ignored: losing the session
/// file only costs the user a re-login.
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `dir/session.json`, loading any existing contents.
    pub fn open(dir: PathBuf) -> Self {
        let path = dir.join(STATE_FILE);
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(error = %e, "Session state file unreadable, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, values }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, "Failed to create state directory");
                return;
            }
        }
        match serde_json::to_string_pretty(&self.values) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    warn!(error = %e, "Failed to write session state");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize session state"),
        }
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn clear(&mut self) {
        self.values.clear();
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(error = %e, "Failed to remove session state file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_clear() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("token"), None);

        store.set("token", "abc");
        store.set("role", "Admin");
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        assert_eq!(store.get("role").as_deref(), Some("Admin"));

        store.clear();
        assert_eq!(store.get("token"), None);
        assert_eq!(store.get("role"), None);

        // Clearing an empty store is a no-op
        store.clear();
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "costbench-store-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        {
            let mut store = FileStore::open(dir.clone());
            store.set("token", "tok");
            store.set("exp", "1700000000000");
        }

        // Reopen and verify the values survived
        let store = FileStore::open(dir.clone());
        assert_eq!(store.get("token").as_deref(), Some("tok"));
        assert_eq!(store.get("exp").as_deref(), Some("1700000000000"));

        let mut store = FileStore::open(dir.clone());
        store.clear();
        let store = FileStore::open(dir.clone());
        assert_eq!(store.get("token"), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
