//! Local filesystem storage implementation.
//!
//! Keeps one pretty-printed JSON record per snapshot in a flat directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── example_com_news-4be1d0c9a2f3.00001769938200000000.1c0ffee5a11d0e21.json
//! ├── example_com_news-4be1d0c9a2f3.00001769938260000000.77aa01b2c3d4e5f6.json
//! └── api_example_com_v1_prices-09f2e8d7c6b5.00001769938200000000.0a1b2c3d4e5f6a7b.json
//! ```
//!
//! Files that do not follow the record naming convention are ignored, so
//! the directory may be shared with other data.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::{SnapshotStorage, is_record_name, record_name, record_prefix};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    ///
    /// The directory is created on first write.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a record name.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        tokio::fs::create_dir_all(&self.root_dir)
            .await
            .map_err(|e| AppError::storage(&self.root_dir, e))?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| AppError::storage(&tmp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| AppError::storage(&tmp, e))?;
        file.flush().await.map_err(|e| AppError::storage(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::storage(&path, e))?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let bytes = tokio::fs::read(self.path(key)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Delete a file, treating a missing file as already deleted.
    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::storage(&path, e)),
        }
    }

    /// Record names in the directory, optionally restricted to a prefix.
    ///
    /// A missing directory has no records.
    async fn record_names(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::storage(&self.root_dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::storage(&self.root_dir, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_record_name(&name) {
                continue;
            }
            if prefix.is_some_and(|p| !name.starts_with(p)) {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Read one record, logging and discarding it if unusable.
    async fn read_record(&self, name: &str) -> Option<Snapshot> {
        match self.read_json::<Snapshot>(name).await {
            Ok(snapshot) if !snapshot.is_consistent() => {
                log::warn!("Skipping record {}: hash does not match content", name);
                None
            }
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Skipping unreadable record {}: {}", name, e);
                None
            }
        }
    }
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn save(&self, snapshot: &Snapshot) -> Result<String> {
        let name = record_name(snapshot);
        self.write_json(&name, snapshot).await?;
        log::debug!("Saved snapshot of {} to {}", snapshot.source(), name);
        Ok(name)
    }

    async fn remove(&self, snapshot: &Snapshot) -> Result<()> {
        self.delete(&record_name(snapshot)).await?;
        Ok(())
    }

    async fn load(&self, source: &str) -> Result<Vec<Snapshot>> {
        let names = self.record_names(Some(&record_prefix(source))).await?;

        let mut records = Vec::with_capacity(names.len());
        for name in names {
            let Some(snapshot) = self.read_record(&name).await else {
                continue;
            };
            if snapshot.source() != source {
                log::warn!(
                    "Skipping record {}: belongs to {}, not {}",
                    name,
                    snapshot.source(),
                    source
                );
                continue;
            }
            records.push((snapshot.timestamp(), name, snapshot));
        }

        records.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        Ok(records.into_iter().map(|(_, _, snapshot)| snapshot).collect())
    }

    async fn clear(&self, source: &str) -> Result<usize> {
        let mut removed = 0;
        for name in self.record_names(Some(&record_prefix(source))).await? {
            if self.delete(&name).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut removed = 0;
        for name in self.record_names(None).await? {
            if self.delete(&name).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn sources(&self) -> Result<Vec<String>> {
        let mut sources = BTreeSet::new();
        for name in self.record_names(None).await? {
            if let Some(snapshot) = self.read_record(&name).await {
                sources.insert(snapshot.source().to_string());
            }
        }
        Ok(sources.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    const SOURCE: &str = "https://example.com/product/42";

    fn snapshot_at(source: &str, price: i64, minute: i64) -> Snapshot {
        let base = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        Snapshot::at(
            source,
            Content::from(json!({ "price": price })),
            base + Duration::minutes(minute),
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let first = snapshot_at(SOURCE, 100, 0);
        let second = snapshot_at(SOURCE, 110, 1);
        // Saved out of order on purpose.
        storage.save(&second).await.unwrap();
        storage.save(&first).await.unwrap();

        let loaded = storage.load(SOURCE).await.unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[tokio::test]
    async fn test_save_creates_one_record() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested"));

        let name = storage.save(&snapshot_at(SOURCE, 100, 0)).await.unwrap();
        let files: Vec<_> = std::fs::read_dir(tmp.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec![name]);
    }

    #[tokio::test]
    async fn test_load_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("never-created"));

        assert!(storage.load(SOURCE).await.unwrap().is_empty());
        assert!(storage.sources().await.unwrap().is_empty());
        assert_eq!(storage.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_skips_malformed_and_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let good = snapshot_at(SOURCE, 100, 0);
        storage.save(&good).await.unwrap();

        // Valid name, broken body.
        let broken = record_name(&snapshot_at(SOURCE, 999, 5));
        std::fs::write(tmp.path().join(&broken), b"{ not json").unwrap();
        // Unrelated files.
        std::fs::write(tmp.path().join("README.md"), b"hello").unwrap();
        std::fs::write(tmp.path().join("notes.json"), b"{}").unwrap();

        let loaded = storage.load(SOURCE).await.unwrap();
        assert_eq!(loaded, vec![good]);
    }

    #[tokio::test]
    async fn test_load_skips_tampered_record() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let snapshot = snapshot_at(SOURCE, 100, 0);
        let name = storage.save(&snapshot).await.unwrap();

        let mut record: serde_json::Value =
            serde_json::from_slice(&std::fs::read(tmp.path().join(&name)).unwrap()).unwrap();
        record["content"]["price"] = json!(1);
        std::fs::write(tmp.path().join(&name), record.to_string()).unwrap();

        assert!(storage.load(SOURCE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sources_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.save(&snapshot_at("https://example.com/a/b", 1, 0)).await.unwrap();
        storage.save(&snapshot_at("https://example.com/a_b", 2, 0)).await.unwrap();

        let a = storage.load("https://example.com/a/b").await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content().get("price"), Some(&Content::from(1)));

        assert_eq!(
            storage.sources().await.unwrap(),
            vec!["https://example.com/a/b", "https://example.com/a_b"]
        );
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let first = snapshot_at(SOURCE, 100, 0);
        storage.save(&first).await.unwrap();
        storage.save(&snapshot_at(SOURCE, 110, 1)).await.unwrap();
        storage.save(&snapshot_at("https://other.example", 5, 0)).await.unwrap();

        storage.remove(&first).await.unwrap();
        // Removing twice is fine.
        storage.remove(&first).await.unwrap();
        assert_eq!(storage.load(SOURCE).await.unwrap().len(), 1);

        assert_eq!(storage.clear(SOURCE).await.unwrap(), 1);
        assert!(storage.load(SOURCE).await.unwrap().is_empty());
        assert_eq!(storage.sources().await.unwrap(), vec!["https://other.example"]);

        std::fs::write(tmp.path().join("keep.txt"), b"x").unwrap();
        assert_eq!(storage.clear_all().await.unwrap(), 1);
        assert!(tmp.path().join("keep.txt").exists());
    }
}
