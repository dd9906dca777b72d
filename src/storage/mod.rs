//! Storage abstractions for snapshot persistence.
//!
//! Every snapshot is one JSON record. Record names are derived from the
//! source and the snapshot itself, so histories of different sources never
//! share a file and a source's records can be listed by name alone.
//!
//! ## Record Naming
//!
//! ```text
//! {slug}-{source_digest}.{timestamp_micros}.{hash_prefix}.json
//!
//! shop_example_item_42-1f3a9c0d2b7e.00001769938200000000.9b1c4f0e2a7d5c33.json
//! ```
//!
//! - `slug`: the source lower-cased, non-alphanumeric runs collapsed to `_`,
//!   at most 48 characters (for humans; may collide)
//! - `source_digest`: first 12 hex chars of SHA-256(source) (disambiguates)
//! - `timestamp_micros`: zero-padded, so names sort chronologically
//! - `hash_prefix`: first 16 hex chars of the snapshot hash

pub mod local;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::models::Snapshot;
use crate::pipeline::hash::hash_text;

// Re-export for convenience
pub use local::LocalStorage;

/// Extension of persisted snapshot records.
pub const RECORD_EXTENSION: &str = "json";

const SLUG_MAX_LEN: usize = 48;
const SOURCE_DIGEST_LEN: usize = 12;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

static RECORD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_]*-[0-9a-f]{12}\.\d{20}\.[0-9a-f]{1,16}\.json$").expect("static regex")
});

/// Human-readable part of a record name.
pub fn source_slug(source: &str) -> String {
    let lowered = source.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');
    slug.chars().take(SLUG_MAX_LEN).collect()
}

/// Name prefix shared by every record of `source`.
pub fn record_prefix(source: &str) -> String {
    let digest = hash_text(source);
    format!("{}-{}.", source_slug(source), &digest[..SOURCE_DIGEST_LEN])
}

/// Record name for one snapshot.
pub fn record_name(snapshot: &Snapshot) -> String {
    format!(
        "{}{:020}.{}.{}",
        record_prefix(snapshot.source()),
        snapshot.timestamp().timestamp_micros().max(0),
        snapshot.short_hash(),
        RECORD_EXTENSION
    )
}

/// Whether a file name follows the record naming convention.
pub fn is_record_name(name: &str) -> bool {
    RECORD_NAME.is_match(name)
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Persist one snapshot, returning its record name.
    async fn save(&self, snapshot: &Snapshot) -> Result<String>;

    /// Delete the record of one snapshot. Missing records are not an error.
    async fn remove(&self, snapshot: &Snapshot) -> Result<()>;

    /// Load every readable record of `source`, oldest first.
    ///
    /// Records that cannot be read or parsed are skipped.
    async fn load(&self, source: &str) -> Result<Vec<Snapshot>>;

    /// Delete every record of `source`, returning how many were removed.
    async fn clear(&self, source: &str) -> Result<usize>;

    /// Delete every record of every source.
    async fn clear_all(&self) -> Result<usize>;

    /// Distinct sources with at least one readable record, sorted.
    async fn sources(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_source_slug() {
        assert_eq!(
            source_slug("https://Shop.example/item?id=42"),
            "https_shop_example_item_id_42"
        );
        assert_eq!(source_slug("///"), "");
        assert_eq!(source_slug(&"a".repeat(100)).len(), SLUG_MAX_LEN);
    }

    #[test]
    fn test_prefix_disambiguates_equal_slugs() {
        let a = record_prefix("https://example.com/a/b");
        let b = record_prefix("https://example.com/a_b");
        assert!(a.starts_with("https_example_com_a_b-"));
        assert!(b.starts_with("https_example_com_a_b-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_name_format() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap();
        let snapshot = Snapshot::at("https://example.com", Content::from(1), ts);
        let name = record_name(&snapshot);

        assert!(name.starts_with(&record_prefix("https://example.com")));
        assert!(name.contains(&format!(".{:020}.", ts.timestamp_micros())));
        assert!(name.ends_with(&format!(".{}.json", snapshot.short_hash())));
        assert!(is_record_name(&name));
    }

    #[test]
    fn test_is_record_name_rejects_foreign_files() {
        assert!(!is_record_name("README.md"));
        assert!(!is_record_name("notes.json"));
        assert!(!is_record_name("x-1f3a9c0d2b7e.00000000000000000001.abcd.tmp"));
    }
}
