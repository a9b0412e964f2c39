//! Persistent profile storage.
//!
//! The profile lives as ten string values under one key path of a
//! key-value store. On Windows that store is the registry; elsewhere a
//! JSON file stands in for it. [`ProfileStore`] is the adapter that maps
//! a [`Profile`] onto those values.

pub mod file;
pub mod memory;
#[cfg(windows)]
pub mod registry;

use crate::error::{Error, Result};
use crate::profile::{BuiltinProfile, Profile, ProfileField};

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(windows)]
pub use registry::RegistryStore;

/// Key path of the NCSI values, below `HKEY_LOCAL_MACHINE`.
pub const DEFAULT_KEY_PATH: &str = r"SYSTEM\CurrentControlSet\Services\NlaSvc\Parameters\Internet";

/// Access mode requested when opening a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Query values only
    Read,
    /// Set values
    Write,
}

/// An open key of a [`KeyValueStore`].
pub trait StoreKey {
    /// Read a string value.
    fn get_string(&self, name: &str) -> std::io::Result<String>;

    /// Write a string value.
    fn set_string(&mut self, name: &str, value: &str) -> std::io::Result<()>;
}

/// A hierarchical store of named string values.
///
/// Implementations only have to open keys; all profile semantics live
/// in [`ProfileStore`].
pub trait KeyValueStore {
    /// Open the key at `path`.
    ///
    /// Opening for [`Access::Read`] must fail when the key does not exist.
    fn open(&self, path: &str, access: Access) -> std::io::Result<Box<dyn StoreKey + '_>>;

    /// Short description for log messages.
    fn describe(&self) -> String;
}

/// A value that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// The field whose write failed
    pub field: ProfileField,
    /// Error reported by the store
    pub reason: String,
}

/// Outcome of [`ProfileStore::save`].
///
/// A save stops at the first failing write, so the report lists the
/// fields that made it to the store and the one that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Fields written, in order
    pub written: Vec<ProfileField>,
    /// The write that stopped the save, if any
    pub failure: Option<WriteFailure>,
}

impl SaveReport {
    /// Check whether all ten values were written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.written.len() == ProfileField::ALL.len()
    }

    /// Fields that were never attempted because an earlier write failed.
    #[must_use]
    pub fn skipped(&self) -> Vec<ProfileField> {
        let attempted = self.written.len() + usize::from(self.failure.is_some());
        ProfileField::ALL.iter().skip(attempted).copied().collect()
    }

    /// Turn an incomplete save into a [`Error::PartialWrite`].
    ///
    /// # Errors
    ///
    /// Returns `PartialWrite` if any write failed.
    pub fn into_result(self) -> Result<()> {
        match self.failure {
            None => Ok(()),
            Some(failure) => Err(Error::PartialWrite {
                field: failure.field.key_name(),
                written: self.written.len(),
                reason: failure.reason,
            }),
        }
    }
}

/// Reads and writes NCSI profiles through a [`KeyValueStore`].
///
/// # Example
///
/// ```ignore
/// let store = ProfileStore::new(Box::new(MemoryStore::new()), DEFAULT_KEY_PATH);
/// store.apply(BuiltinProfile::VendorDefault)?;
/// let profile = store.load()?;
/// ```
pub struct ProfileStore {
    backend: Box<dyn KeyValueStore>,
    path: String,
}

impl ProfileStore {
    /// Create a profile store over `backend` rooted at `path`.
    pub fn new(backend: Box<dyn KeyValueStore>, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }

    /// Key path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Description of the backend, for display.
    #[must_use]
    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Load the profile currently stored.
    ///
    /// Each value is read on its own; a value that cannot be read comes
    /// back as an empty string.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the key cannot be opened.
    pub fn load(&self) -> Result<Profile> {
        let key = self
            .backend
            .open(&self.path, Access::Read)
            .map_err(|e| Error::store_unavailable(&self.path, e))?;

        let mut profile = Profile::default();
        for field in ProfileField::ALL {
            match key.get_string(field.key_name()) {
                Ok(value) => field.set(&mut profile, value),
                Err(e) => {
                    tracing::debug!("{} not readable, using empty value: {e}", field);
                }
            }
        }

        Ok(profile)
    }

    /// Write every value of `profile` to the store.
    ///
    /// Values are written in [`ProfileField::ALL`] order. The first
    /// failing write stops the save; this is reported through the
    /// returned [`SaveReport`] rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the key cannot be opened for writing.
    pub fn save(&self, profile: &Profile) -> Result<SaveReport> {
        let mut key = self
            .backend
            .open(&self.path, Access::Write)
            .map_err(|e| Error::store_unavailable(&self.path, e))?;

        let mut report = SaveReport::default();
        for (field, value) in profile.entries() {
            if let Err(e) = key.set_string(field.key_name(), value) {
                tracing::warn!(
                    "Writing {} failed after {} of {} values: {e}",
                    field,
                    report.written.len(),
                    ProfileField::ALL.len()
                );
                report.failure = Some(WriteFailure {
                    field,
                    reason: e.to_string(),
                });
                break;
            }
            tracing::debug!("{} = {value}", field);
            report.written.push(field);
        }

        Ok(report)
    }

    /// Write one of the built-in profiles.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the key cannot be opened for writing.
    pub fn apply(&self, builtin: BuiltinProfile) -> Result<SaveReport> {
        let report = self.save(&builtin.profile())?;
        if report.is_complete() {
            tracing::info!("Applied {builtin} profile to {}", self.path);
        }
        Ok(report)
    }
}
