//! Settings and their loader.
//!
//! Settings come from an optional JSON file; every value has a default so
//! the tool runs without one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::probe::dns::{DEFAULT_DNS_PORT, DEFAULT_DNS_TIMEOUT_SECS};
use crate::probe::http::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::probe::{DnsProbe, Verifier};
use crate::store::{FileStore, KeyValueStore, ProfileStore, DEFAULT_KEY_PATH};

/// Directory name below the platform config directory.
const APP_DIR: &str = "ncsictl";

/// Which key-value store holds the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Windows registry
    Registry,
    /// JSON file
    File,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(windows) {
            Self::Registry
        } else {
            Self::File
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Backend holding the profile
    pub backend: Backend,
    /// Key path of the ten values
    pub key_path: String,
    /// Backing file of the file backend
    pub file: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            key_path: DEFAULT_KEY_PATH.to_string(),
            file: ConfigLoader::config_dir().join("store.json"),
        }
    }
}

/// Probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Timeout of the HTTP probe, in seconds
    pub http_timeout_secs: u64,
    /// Read timeout of the DNS probe, in seconds
    pub dns_timeout_secs: u64,
    /// Port DNS queries are sent to
    pub dns_port: u16,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            dns_timeout_secs: DEFAULT_DNS_TIMEOUT_SECS,
            dns_port: DEFAULT_DNS_PORT,
        }
    }
}

/// Complete ncsictl settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the profile is stored
    pub store: StoreSettings,
    /// How probes are run
    pub probe: ProbeSettings,
}

impl Settings {
    /// Use the file backend with the given file.
    #[must_use]
    pub fn with_store_file(mut self, file: PathBuf) -> Self {
        self.store.backend = Backend::File;
        self.store.file = file;
        self
    }

    /// Build the profile store these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry backend is selected on a platform
    /// without a registry.
    pub fn profile_store(&self) -> Result<ProfileStore> {
        let backend: Box<dyn KeyValueStore> = match self.store.backend {
            Backend::File => Box::new(FileStore::new(&self.store.file)),
            Backend::Registry => registry_backend()?,
        };
        Ok(ProfileStore::new(backend, self.store.key_path.clone()))
    }

    /// Build the verifier these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn verifier(&self) -> Result<Verifier> {
        let dns = DnsProbe::with_settings(
            self.probe.dns_port,
            Duration::from_secs(self.probe.dns_timeout_secs),
        );
        Verifier::new(Duration::from_secs(self.probe.http_timeout_secs), dns)
    }

    fn validate(&self) -> Result<()> {
        if self.store.key_path.trim().is_empty() {
            return Err(Error::config("store.key_path must not be empty"));
        }
        if self.probe.http_timeout_secs == 0 || self.probe.dns_timeout_secs == 0 {
            return Err(Error::config("probe timeouts must be at least one second"));
        }
        if self.probe.dns_port == 0 {
            return Err(Error::config("probe.dns_port must not be 0"));
        }
        Ok(())
    }
}

#[cfg(windows)]
fn registry_backend() -> Result<Box<dyn KeyValueStore>> {
    Ok(Box::new(crate::store::RegistryStore::new()))
}

#[cfg(not(windows))]
fn registry_backend() -> Result<Box<dyn KeyValueStore>> {
    Err(Error::config(
        "The registry backend is only available on Windows, use the file backend",
    ))
}

/// Settings loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a JSON file.
    ///
    /// Missing keys take their default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// invalid values.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = ConfigLoader::load_from_file("config.json")?;
    /// let store = settings.profile_store()?;
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location.
    ///
    /// Reads `$CONFIG_DIR/ncsictl/config.json` if it exists, otherwise
    /// returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the default file exists but cannot be parsed.
    pub fn load_default() -> Result<Settings> {
        let path = Self::config_dir().join("config.json");
        if path.exists() {
            tracing::debug!("Loading settings from {}", path.display());
            Self::load_from_file(path)
        } else {
            Ok(Settings::default())
        }
    }

    /// Load settings from `path` if given, else from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}
