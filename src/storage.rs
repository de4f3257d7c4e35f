//! Durable client-side storage.
//!
//! The session manager persists exactly two values: the bearer token and
//! the serialized user record. The [`KeyValueStore`] port keeps the
//! manager independent of where those values actually live, so an
//! embedder can swap the CLI's JSON file for a secure OS store without
//! touching the manager.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// A minimal string key-value port.
///
/// Writes take effect immediately and the port has no failure surface
/// of its own; a backend that cannot persist logs the problem and
/// carries on, mirroring the browser storage this models. Nothing
/// outside the session manager should touch the `token`/`user` keys
/// directly.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> { (**self).get(key) }

    fn set(&mut self, key: &str, value: &str) { (**self).set(key, value) }

    fn remove(&mut self, key: &str) { (**self).remove(key) }
}

/// Lets several owners share one underlying store, typically a manager
/// plus a test asserting on what it wrote.
impl<S: KeyValueStore> KeyValueStore for Arc<Mutex<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().unwrap_or_else(|e| e.into_inner()).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.lock().unwrap_or_else(|e| e.into_inner()).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        self.lock().unwrap_or_else(|e| e.into_inner()).remove(key)
    }
}

/// A transient store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore { MemoryStore::default() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// A store backed by a single JSON file holding a string map.
///
/// The file is read once when the store is opened. Unreadable or
/// malformed content is treated as an empty store so a damaged file can
/// never keep the application from starting.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> FileStore {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!(
                        "Discarding the malformed store at {}: {}",
                        path.display(),
                        err
                    );
                    HashMap::new()
                },
            },
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => {
                HashMap::new()
            },
            Err(err) => {
                log::warn!("Unable to read {}: {}", path.display(), err);
                HashMap::new()
            },
        };

        FileStore { path, entries }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::error!("Unable to create {}: {}", parent.display(), err);
                return;
            }
        }

        match serde_json::to_string_pretty(&self.entries) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    log::error!(
                        "Unable to persist {}: {}",
                        self.path.display(),
                        err
                    );
                }
            },
            Err(err) => log::error!("Unable to serialize the store: {}", err),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_file_store_survives_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = FileStore::open(&path);
        store.set(TOKEN_KEY, "TOKEN-123");
        store.set(USER_KEY, r#"{"username":"defne"}"#);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), Some(String::from("TOKEN-123")));
        assert_eq!(
            reopened.get(USER_KEY),
            Some(String::from(r#"{"username":"defne"}"#))
        );
    }

    #[test]
    fn a_malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn removing_a_key_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = FileStore::open(&path);
        store.set(TOKEN_KEY, "TOKEN-123");
        store.remove(TOKEN_KEY);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), None);
    }
}
