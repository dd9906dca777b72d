// src/services/tracker.rs

//! Snapshot tracker service.
//!
//! Owns the bounded per-source history, persists snapshots when a storage
//! backend is configured, and answers change queries for the scraping
//! layer.
//!
//! The source map sits behind an `RwLock`; each source's history has its
//! own `Mutex`, held for the whole append/evict/persist sequence. Writers
//! for the same source are serialized, writers for different sources never
//! wait on each other, and readers always see a whole history.
//!
//! Entries are never removed from the map. Clearing empties a history in
//! place under its lock, and a source counts as tracked only while its
//! history is non-empty.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::models::{CompareResult, Content, Snapshot, TrackerConfig};
use crate::pipeline::{compare, hash_content};
use crate::storage::{LocalStorage, SnapshotStorage};

type History = Arc<Mutex<VecDeque<Snapshot>>>;

/// Result of observing content through [`SnapshotTracker::observe`].
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    /// True on first sight or when the content hash differs from the latest
    pub changed: bool,
    /// Changes against the latest snapshot; `None` on first sight
    pub changes: Option<CompareResult>,
    /// The snapshot that was recorded
    pub snapshot: Snapshot,
}

/// Bounded, optionally persistent, per-source snapshot history.
pub struct SnapshotTracker {
    config: TrackerConfig,
    storage: Option<Arc<dyn SnapshotStorage>>,
    histories: RwLock<HashMap<String, History>>,
}

impl SnapshotTracker {
    /// Create a tracker from configuration.
    ///
    /// Snapshots are persisted to `storage_dir` when it is set.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let storage = config
            .storage_dir
            .as_ref()
            .map(|dir| Arc::new(LocalStorage::new(dir)) as Arc<dyn SnapshotStorage>);
        Ok(Self::build(config, storage))
    }

    /// Create a tracker persisting through a custom storage backend.
    ///
    /// `storage_dir` in the configuration is ignored.
    pub fn with_storage(config: TrackerConfig, storage: Arc<dyn SnapshotStorage>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Some(storage)))
    }

    fn build(config: TrackerConfig, storage: Option<Arc<dyn SnapshotStorage>>) -> Self {
        Self {
            config,
            storage,
            histories: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    async fn existing_history(&self, source: &str) -> Option<History> {
        self.histories.read().await.get(source).cloned()
    }

    async fn history(&self, source: &str) -> History {
        if let Some(history) = self.existing_history(source).await {
            return history;
        }
        self.histories
            .write()
            .await
            .entry(source.to_string())
            .or_default()
            .clone()
    }

    /// Record an observation of `source` and return the new snapshot.
    ///
    /// Evicts the oldest snapshot when the history is full. With storage
    /// configured, the snapshot is persisted before it joins the history;
    /// a failed write leaves the history unchanged and is returned.
    pub async fn snapshot(&self, source: &str, content: Content) -> Result<Snapshot> {
        let history = self.history(source).await;
        let mut entries = history.lock().await;
        self.append(source, content, &mut entries).await
    }

    async fn append(
        &self,
        source: &str,
        content: Content,
        entries: &mut VecDeque<Snapshot>,
    ) -> Result<Snapshot> {
        let timestamp = next_timestamp(entries.back());
        let snapshot = Snapshot::at(source, content, timestamp);

        if let Some(storage) = &self.storage {
            storage.save(&snapshot).await?;
        }
        entries.push_back(snapshot.clone());

        while entries.len() > self.config.max_snapshots {
            let Some(evicted) = entries.pop_front() else {
                break;
            };
            log::debug!(
                "Evicted snapshot {} of {} (capacity {})",
                evicted.short_hash(),
                source,
                self.config.max_snapshots
            );
            if let Some(storage) = &self.storage {
                // The next load trims to capacity anyway.
                if let Err(e) = storage.remove(&evicted).await {
                    log::warn!("Failed to delete evicted record of {}: {}", source, e);
                }
            }
        }

        Ok(snapshot)
    }

    /// Full in-memory history of `source`, oldest first.
    pub async fn get_snapshots(&self, source: &str) -> Vec<Snapshot> {
        let Some(history) = self.existing_history(source).await else {
            return Vec::new();
        };
        let entries = history.lock().await;
        entries.iter().cloned().collect()
    }

    /// Most recent snapshot of `source`.
    pub async fn get_latest(&self, source: &str) -> Option<Snapshot> {
        let history = self.existing_history(source).await?;
        let entries = history.lock().await;
        entries.back().cloned()
    }

    /// Number of snapshots held for `source`.
    pub async fn history_len(&self, source: &str) -> usize {
        let Some(history) = self.existing_history(source).await else {
            return 0;
        };
        let entries = history.lock().await;
        entries.len()
    }

    /// Whether `content` differs from the latest snapshot of `source`.
    ///
    /// Answered from hashes alone; true when nothing was recorded yet.
    pub async fn has_changed(&self, source: &str, content: &Content) -> bool {
        let Some(history) = self.existing_history(source).await else {
            return true;
        };
        let entries = history.lock().await;
        match entries.back() {
            Some(latest) => latest.hash() != hash_content(content),
            None => true,
        }
    }

    /// Changes from the latest snapshot of `source` to `content`.
    ///
    /// `None` when nothing was recorded yet. Does not record `content`.
    pub async fn get_changes(&self, source: &str, content: &Content) -> Option<CompareResult> {
        let history = self.existing_history(source).await?;
        let entries = history.lock().await;
        let latest = entries.back()?;
        let candidate = Snapshot::capture(source, content.clone());
        Some(compare(latest, &candidate))
    }

    /// Compare two historical snapshots of `source` by position.
    ///
    /// `None` if either index is out of range.
    pub async fn compare_snapshots(
        &self,
        source: &str,
        index_a: usize,
        index_b: usize,
    ) -> Option<CompareResult> {
        let history = self.existing_history(source).await?;
        let entries = history.lock().await;
        let a = entries.get(index_a)?;
        let b = entries.get(index_b)?;
        Some(compare(a, b))
    }

    /// Check, diff and record `content` in one step.
    ///
    /// Holds the source's lock throughout, so the reported changes are
    /// exactly those between the previous latest and the new snapshot.
    pub async fn observe(&self, source: &str, content: Content) -> Result<Observation> {
        let history = self.history(source).await;
        let mut entries = history.lock().await;

        let previous = entries.back().cloned();
        let snapshot = self.append(source, content, &mut entries).await?;

        let changes = previous.as_ref().map(|prev| compare(prev, &snapshot));
        let changed = previous.is_none_or(|prev| prev.hash() != snapshot.hash());

        Ok(Observation {
            changed,
            changes,
            snapshot,
        })
    }

    /// Forget the history of `source`, including persisted records.
    ///
    /// The source's entry stays in the map with an empty history, so a
    /// concurrent `snapshot` either lands before the clear and is removed
    /// with it, or lands after it and is kept both in memory and on disk.
    pub async fn clear(&self, source: &str) -> Result<()> {
        let history = self.history(source).await;
        let mut entries = history.lock().await;
        entries.clear();
        if let Some(storage) = &self.storage {
            let removed = storage.clear(source).await?;
            log::info!("Cleared {} persisted snapshots of {}", removed, source);
        }
        Ok(())
    }

    /// Forget every history, including persisted records.
    ///
    /// Holds the map write lock and every source's lock until storage is
    /// cleared, so no snapshot can be persisted in between.
    pub async fn clear_all(&self) -> Result<()> {
        let histories = self.histories.write().await;
        let mut guards = Vec::with_capacity(histories.len());
        for history in histories.values() {
            let mut entries = history.lock().await;
            entries.clear();
            guards.push(entries);
        }
        if let Some(storage) = &self.storage {
            let removed = storage.clear_all().await?;
            log::info!("Cleared {} persisted snapshots", removed);
        }
        drop(guards);
        drop(histories);
        Ok(())
    }

    /// Sources holding at least one snapshot, sorted.
    pub async fn get_tracked_urls(&self) -> Vec<String> {
        let histories: Vec<(String, History)> = self
            .histories
            .read()
            .await
            .iter()
            .map(|(source, history)| (source.clone(), Arc::clone(history)))
            .collect();

        let mut sources = Vec::with_capacity(histories.len());
        for (source, history) in histories {
            if !history.lock().await.is_empty() {
                sources.push(source);
            }
        }
        sources.sort();
        sources
    }

    /// Replace the in-memory history of `source` with its persisted one.
    ///
    /// Keeps the newest `max_snapshots` records and returns how many were
    /// loaded. Unreadable records are skipped. Without storage this is a
    /// no-op returning 0.
    pub async fn load_snapshots(&self, source: &str) -> Result<usize> {
        let Some(storage) = &self.storage else {
            return Ok(0);
        };

        let mut records = storage.load(source).await?;
        let excess = records.len().saturating_sub(self.config.max_snapshots);
        records.drain(..excess);

        let loaded = records.len();
        if loaded == 0 {
            log::debug!("No persisted snapshots for {}", source);
            return Ok(0);
        }

        let history = self.history(source).await;
        *history.lock().await = VecDeque::from(records);
        log::info!("Loaded {} snapshots of {}", loaded, source);
        Ok(loaded)
    }

    /// Load the persisted history of every source found in storage.
    ///
    /// Returns the total number of snapshots loaded.
    pub async fn load_all(&self) -> Result<usize> {
        let Some(storage) = &self.storage else {
            return Ok(0);
        };
        let sources = storage.sources().await?;
        let counts =
            futures::future::try_join_all(sources.iter().map(|s| self.load_snapshots(s))).await?;
        Ok(counts.into_iter().sum())
    }
}

/// Now, or just after the previous snapshot if the clock has not moved
/// past it, so a history's timestamps strictly increase. Microsecond
/// precision matches the record names.
fn next_timestamp(previous: Option<&Snapshot>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) if prev.timestamp() >= now => prev.timestamp() + Duration::microseconds(1),
        _ => now,
    }
}
