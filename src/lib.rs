// src/lib.rs

//! snaptrack: content change detection for scraped sources.
//!
//! Hash, diff and compare structured observations of a source (typically
//! a URL), and keep a bounded, persistent history per source.
//!
//! ```no_run
//! use snaptrack::{Content, SnapshotTracker, TrackerConfig};
//!
//! # async fn example() -> snaptrack::error::Result<()> {
//! let tracker = SnapshotTracker::new(TrackerConfig::with_capacity(10).storage_dir("snapshots"))?;
//! tracker.load_snapshots("https://example.com/item").await?;
//!
//! let content = Content::from(serde_json::json!({"price": 100}));
//! let observation = tracker.observe("https://example.com/item", content).await?;
//! if let Some(result) = observation.changes {
//!     for change in &result.changes {
//!         println!("{change}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::{
    Change, ChangeSummary, ChangeType, CompareResult, Content, Scalar, SequenceChange, Snapshot,
    TrackerConfig,
};
pub use pipeline::{array_diff, array_diff_by, compare, diff, hash_content, string_similarity};
pub use services::{Observation, SnapshotTracker};
