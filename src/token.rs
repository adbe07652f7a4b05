use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// The single durable slot holding the current bearer token.
///
/// Both the session provider and the HTTP adapter's 401 handler write here;
/// every write is a full overwrite of "the current truth" (or absence), so
/// last-write-wins is acceptable. `get` reads the backing storage fresh on
/// every call — callers must not cache the result across requests.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Backing>,
}

enum Backing {
    Memory(Mutex<Option<String>>),
    File(PathBuf),
}

impl TokenStore {
    /// File-backed store, the real client's durable storage.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { inner: Arc::new(Backing::File(path.into())) }
    }

    /// In-memory store for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self { inner: Arc::new(Backing::Memory(Mutex::new(None))) }
    }

    pub fn get(&self) -> Option<String> {
        match &*self.inner {
            Backing::Memory(slot) => slot.lock().expect("token slot poisoned").clone(),
            Backing::File(path) => std::fs::read_to_string(path)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Idempotent overwrite. Storage failures degrade to a warning; an
    /// unwritable token slot behaves like an absent token on the next read.
    pub fn set(&self, token: &str) {
        match &*self.inner {
            Backing::Memory(slot) => {
                *slot.lock().expect("token slot poisoned") = Some(token.to_string());
            }
            Backing::File(path) => {
                if let Some(parent) = path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        warn!("could not create token directory {}: {e}", parent.display());
                        return;
                    }
                }
                if let Err(e) = std::fs::write(path, token) {
                    warn!("could not persist token to {}: {e}", path.display());
                }
            }
        }
    }

    pub fn clear(&self) {
        match &*self.inner {
            Backing::Memory(slot) => {
                *slot.lock().expect("token slot poisoned") = None;
            }
            Backing::File(path) => match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("could not clear token at {}: {e}", path.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_clear() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get(), None);
        store.set("tok-1");
        assert_eq!(store.get(), Some("tok-1".to_string()));
        store.set("tok-2");
        assert_eq!(store.get(), Some("tok-2".to_string()));
        store.clear();
        assert_eq!(store.get(), None);
        // clearing an already-empty slot is fine
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn file_store_round_trips_and_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "petpals-token-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let store = TokenStore::at_path(&path);
        store.clear();
        assert_eq!(store.get(), None);
        store.set("persisted");

        // A fresh handle over the same path sees the token: this is the
        // reload-survival property.
        let reopened = TokenStore::at_path(&path);
        assert_eq!(reopened.get(), Some("persisted".to_string()));

        reopened.clear();
        assert_eq!(store.get(), None);
    }
}
