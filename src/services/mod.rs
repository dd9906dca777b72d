// src/services/mod.rs

//! Stateful services.
//!
//! - `SnapshotTracker`: bounded per-source history with persistence and
//!   change queries

pub mod tracker;

pub use tracker::{Observation, SnapshotTracker};
