//! Configuration module.
//!
//! This module provides the settings that select the profile store and
//! tune the probes, and the loader that reads them from disk.

pub mod loader;

pub use loader::{Backend, ConfigLoader, ProbeSettings, Settings, StoreSettings};
