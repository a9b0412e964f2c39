//! In-memory key-value store.
//!
//! Nothing is persisted across restarts. Clones share the same data, so a
//! test can keep one handle for inspection and hand another to a
//! [`ProfileStore`](crate::store::ProfileStore).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::{Access, KeyValueStore, StoreKey};

type Values = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct Inner {
    keys: HashMap<String, Values>,
    failing: HashSet<String>,
    read_only: bool,
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single value, creating the key if needed.
    pub fn insert(&self, path: &str, name: &str, value: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .keys
                .entry(path.to_string())
                .or_default()
                .insert(name.to_string(), value.to_string());
        }
    }

    /// Copy of every value stored under `path`.
    #[must_use]
    pub fn snapshot(&self, path: &str) -> Option<Values> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.keys.get(path).cloned())
    }

    /// Make every later write of `name` fail.
    pub fn fail_writes_to(&self, name: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(name.to_string());
        }
    }

    /// Refuse (or allow again) opening keys for writing.
    pub fn set_read_only(&self, read_only: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.read_only = read_only;
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("memory store poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn open(&self, path: &str, access: Access) -> io::Result<Box<dyn StoreKey + '_>> {
        let mut inner = self.lock()?;
        match access {
            Access::Read if !inner.keys.contains_key(path) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("key {path} does not exist"),
                ));
            }
            Access::Write if inner.read_only => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "store is read-only",
                ));
            }
            Access::Write => {
                inner.keys.entry(path.to_string()).or_default();
            }
            Access::Read => {}
        }

        Ok(Box::new(MemoryKey {
            store: self,
            path: path.to_string(),
        }))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

struct MemoryKey<'a> {
    store: &'a MemoryStore,
    path: String,
}

impl StoreKey for MemoryKey<'_> {
    fn get_string(&self, name: &str) -> io::Result<String> {
        let inner = self.store.lock()?;
        inner
            .keys
            .get(&self.path)
            .and_then(|values| values.get(name))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not set")))
    }

    fn set_string(&mut self, name: &str, value: &str) -> io::Result<()> {
        let mut inner = self.store.lock()?;
        if inner.failing.contains(name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write to {name} refused"),
            ));
        }
        inner
            .keys
            .entry(self.path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}
