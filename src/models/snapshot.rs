// src/models/snapshot.rs

//! Snapshot data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Content;
use crate::pipeline::hash_content;

/// One recorded observation of a source.
///
/// Fields are read-only once the snapshot is created; callers receive
/// clones, so the tracker's stored history can never be mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    source: String,
    timestamp: DateTime<Utc>,
    hash: String,
    content: Content,
}

impl Snapshot {
    /// Capture `content` for `source` at the current time.
    pub fn capture(source: impl Into<String>, content: Content) -> Self {
        Self::at(source, content, Utc::now())
    }

    /// Capture `content` for `source` at a given time.
    pub fn at(source: impl Into<String>, content: Content, timestamp: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            timestamp,
            hash: hash_content(&content),
            content,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Whether the stored hash matches the content, e.g. after loading
    /// a persisted record.
    pub fn is_consistent(&self) -> bool {
        self.hash == hash_content(&self.content)
    }

    /// Short form of the hash for display and file names.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..16).unwrap_or(&self.hash)
    }
}
