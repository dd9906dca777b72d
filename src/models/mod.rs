// src/models/mod.rs

//! Domain models for the snapshot tracker.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod change;
mod config;
mod content;
mod snapshot;

// Re-export all public types
pub use change::{Change, ChangeSummary, ChangeType, CompareResult, SequenceChange};
pub use config::{Config, LoggingConfig, TrackerConfig};
pub(crate) use content::format_number;
pub use content::{Content, Scalar};
pub use snapshot::Snapshot;
