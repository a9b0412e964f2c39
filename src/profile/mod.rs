//! Profile module.
//!
//! This module provides the NCSI profile model:
//! - The ten-field profile and its persisted value names
//! - The two built-in profiles that may be applied

pub mod builtin;
pub mod types;

pub use builtin::{alternative_profile, vendor_default_profile, BuiltinProfile};
pub use types::*;
