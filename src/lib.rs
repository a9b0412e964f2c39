//! ncsictl - Inspect, switch and verify the Windows NCSI probe profile.
//!
//! The Network Connectivity Status Indicator decides whether a machine is
//! online by fetching a known file over HTTP and resolving a known name.
//! This crate provides both a library API and a CLI tool for:
//! - Reading the ten probe values from the registry (or a JSON file)
//! - Applying the alternative or the vendor-default profile
//! - Checking that the configured endpoints answer as declared
//! - An interactive menu over the same actions
//!
//! # Library Usage
//!
//! ```ignore
//! use ncsictl::{BuiltinProfile, ConfigLoader};
//!
//! let settings = ConfigLoader::load_default()?;
//! let store = settings.profile_store()?;
//! store.apply(BuiltinProfile::Alternative)?;
//!
//! let verifier = settings.verifier()?;
//! let report = verifier.verify(&store.load()?).await;
//! assert!(report.all_passed());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Interactive menu (default)
//! ncsictl
//!
//! # Show the current values, or a built-in profile
//! ncsictl show
//! ncsictl show --builtin vendor-default
//!
//! # Apply a profile (elevated prompt required for the registry)
//! ncsictl apply alternative
//! ncsictl apply vendor-default --strict
//!
//! # Test the internet connection
//! ncsictl test --format json
//!
//! # Work on a JSON file instead of the registry
//! ncsictl --store-file ncsi.json apply alternative
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod profile;
pub mod store;

// Re-export commonly used types
pub use actions::{Action, Console};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use probe::{ProbeKind, ProbeResult, TestReport, Verifier};
pub use profile::{BuiltinProfile, Profile, ProfileField};
pub use store::{KeyValueStore, ProfileStore, SaveReport};
