//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports showing the current NCSI profile, applying a built-in
//! profile, testing connectivity, and an interactive menu.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::profile::BuiltinProfile;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Apply { profile, .. }) => { /* ... */ }
///     Some(Commands::Test) => { /* ... */ }
///     None => { /* interactive menu */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "ncsictl",
    version,
    about = "Inspect, switch and verify the NCSI connectivity probe profile",
    long_about = "Reads the Network Connectivity Status Indicator profile, applies the \
                  alternative or vendor-default profile, and checks that the configured \
                  probe endpoints answer as expected.",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Settings file (JSON)
    #[arg(short, long, global = true, env = "NCSICTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store the profile in this JSON file instead of the configured backend
    #[arg(long, global = true)]
    pub store_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Available commands for the ncsictl CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Display the current NCSI values
    ///
    /// Reads the ten probe values from the store. With --builtin, prints
    /// one of the built-in profiles instead.
    #[command(alias = "s")]
    Show {
        /// Show a built-in profile (alternative, vendor-default)
        #[arg(short, long)]
        builtin: Option<BuiltinProfile>,
    },

    /// Apply a built-in NCSI profile
    ///
    /// Writes all ten values of the alternative or the vendor-default
    /// profile. Requires an elevated prompt with the registry backend.
    #[command(alias = "a")]
    Apply {
        /// Profile to apply (alternative, vendor-default)
        profile: BuiltinProfile,

        /// Fail if any value could not be written
        #[arg(long)]
        strict: bool,
    },

    /// Test the internet connection
    ///
    /// Runs the web and DNS probes of the current profile for IPv4 and
    /// IPv6. Exits with a non-zero status when a probe fails.
    #[command(alias = "t")]
    Test,

    /// Start the interactive menu
    #[command(alias = "m")]
    Menu,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
