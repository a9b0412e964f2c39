//! Error types module.
//!
//! This module defines the error types used throughout ncsictl.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.
//!
//! Store errors abort the current action. Probe errors are collected per
//! probe by the verifier and never abort the remaining probes.

use thiserror::Error;

/// A specialized `Result` type for ncsictl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for ncsictl.
#[derive(Debug, Error)]
pub enum Error {
    /// The persistent store could not be opened at the configured key path.
    #[error("Unable to open {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// A save stopped before all ten fields were written.
    #[error("Profile partially written ({written}/10 values), {field} failed: {reason}")]
    PartialWrite {
        field: &'static str,
        written: usize,
        reason: String,
    },

    /// The HTTP request could not be sent or no response came back.
    #[error("Unable to reach {url}: {reason}")]
    UnreachableEndpoint { url: String, reason: String },

    /// The HTTP response status was not 200.
    #[error("HTTP status code {status}")]
    UnexpectedStatus { status: u16 },

    /// The HTTP response body could not be fully read.
    #[error("Unable to read response body: {0}")]
    ReadFailure(String),

    /// A probe answered, but not with the expected content.
    #[error("Invalid content '{actual}'. Expected '{expected}'")]
    ContentMismatch { actual: String, expected: String },

    /// No DNS response was received at all.
    #[error("Error getting the {family} address of {host}: {reason}")]
    ResolutionFailure {
        host: String,
        family: &'static str,
        reason: String,
    },

    /// The DNS server answered with a non-success response code.
    #[error("Invalid answer name {host} after {record} query: {rcode}")]
    QueryRejected {
        host: String,
        record: &'static str,
        rcode: String,
    },

    /// The DNS response carried no answer records.
    #[error("No {record} record in answer for {host}")]
    EmptyAnswer { host: String, record: &'static str },

    /// I/O error (config files, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (invalid config, unsupported backend)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid input format, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create a new store-unavailable error.
    #[must_use]
    pub fn store_unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new unreachable-endpoint error.
    #[must_use]
    pub fn unreachable(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnreachableEndpoint {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new content-mismatch error.
    #[must_use]
    pub fn mismatch(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ContentMismatch {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Stable, machine-readable name of the error kind.
    ///
    /// Used as `error_kind` in JSON test reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::PartialWrite { .. } => "partial_write",
            Self::UnreachableEndpoint { .. } => "unreachable_endpoint",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::ReadFailure(_) => "read_failure",
            Self::ContentMismatch { .. } => "content_mismatch",
            Self::ResolutionFailure { .. } => "resolution_failure",
            Self::QueryRejected { .. } => "query_rejected",
            Self::EmptyAnswer { .. } => "empty_answer",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Config(_) => "config",
            Self::Parse(_) => "parse",
        }
    }
}
