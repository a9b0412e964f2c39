//! JSON file key-value store.
//!
//! Mirrors the registry layout in a single JSON document so the tool can
//! be used (and tested) where no registry exists:
//!
//! ```json
//! {
//!   "version": "1",
//!   "keys": {
//!     "SYSTEM\\CurrentControlSet\\Services\\NlaSvc\\Parameters\\Internet": {
//!       "ActiveWebProbeHost": "www.msftncsi.com"
//!     }
//!   }
//! }
//! ```
//!
//! Every write is flushed to disk immediately through a temporary file
//! and a rename.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::{Access, KeyValueStore, StoreKey};

const STORE_FILE_VERSION: &str = "1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    version: String,
    #[serde(default)]
    keys: BTreeMap<String, BTreeMap<String, String>>,
}

/// Key-value store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store over the JSON file at `path`.
    ///
    /// The file is only touched when a key is opened.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_document(&self) -> io::Result<Option<StoreDocument>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_document(&self, document: &StoreDocument) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn open(&self, path: &str, access: Access) -> io::Result<Box<dyn StoreKey + '_>> {
        let document = self.read_document()?;
        let document = match (document, access) {
            (Some(doc), Access::Read) if doc.keys.contains_key(path) => doc,
            (_, Access::Read) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("key {path} not found in {}", self.path.display()),
                ));
            }
            (Some(doc), Access::Write) => doc,
            (None, Access::Write) => StoreDocument {
                version: STORE_FILE_VERSION.to_string(),
                keys: BTreeMap::new(),
            },
        };

        tracing::debug!("Opened {path} in {} ({access:?})", self.path.display());
        Ok(Box::new(FileKey {
            store: self,
            path: path.to_string(),
            document,
        }))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

struct FileKey<'a> {
    store: &'a FileStore,
    path: String,
    document: StoreDocument,
}

impl StoreKey for FileKey<'_> {
    fn get_string(&self, name: &str) -> io::Result<String> {
        self.document
            .keys
            .get(&self.path)
            .and_then(|values| values.get(name))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not set")))
    }

    fn set_string(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.document
            .keys
            .entry(self.path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self.store.write_document(&self.document)
    }
}
