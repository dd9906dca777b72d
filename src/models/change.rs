// src/models/change.rs

//! Change records produced by the differs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Content;

/// Kind of change at one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// Present only in the new value
    Added,
    /// Present only in the old value
    Removed,
    /// Present in both, values differ
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "ADDED",
            ChangeType::Removed => "REMOVED",
            ChangeType::Modified => "MODIFIED",
        }
    }

    fn symbol(&self) -> char {
        match self {
            ChangeType::Added => '+',
            ChangeType::Removed => '-',
            ChangeType::Modified => '~',
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change between two structured values.
///
/// `path` uses dot-separated keys and `[index]` suffixes, e.g.
/// `user.age` or `items[2]`. An empty path means the root was replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Content>,
}

impl Change {
    pub fn added(path: impl Into<String>, new_value: Content) -> Self {
        Self {
            change_type: ChangeType::Added,
            path: path.into(),
            old_value: None,
            new_value: Some(new_value),
        }
    }

    pub fn removed(path: impl Into<String>, old_value: Content) -> Self {
        Self {
            change_type: ChangeType::Removed,
            path: path.into(),
            old_value: Some(old_value),
            new_value: None,
        }
    }

    pub fn modified(path: impl Into<String>, old_value: Content, new_value: Content) -> Self {
        Self {
            change_type: ChangeType::Modified,
            path: path.into(),
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        };
        write!(f, "{} {}", self.change_type.symbol(), path)?;
        match (&self.old_value, &self.new_value) {
            (Some(old), Some(new)) => write!(f, ": {} -> {}", old, new),
            (Some(value), None) | (None, Some(value)) => write!(f, ": {}", value),
            (None, None) => Ok(()),
        }
    }
}

/// Per-type change counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
}

impl ChangeSummary {
    /// Tally a list of changes by type.
    pub fn tally(changes: &[Change]) -> Self {
        changes
            .iter()
            .fold(Self::default(), |mut summary, change| {
                match change.change_type {
                    ChangeType::Added => summary.added += 1,
                    ChangeType::Modified => summary.modified += 1,
                    ChangeType::Removed => summary.removed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.added + self.modified + self.removed
    }
}

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResult {
    pub has_changes: bool,
    pub changes: Vec<Change>,
    pub summary: ChangeSummary,
}

impl CompareResult {
    pub fn from_changes(changes: Vec<Change>) -> Self {
        Self {
            has_changes: !changes.is_empty(),
            summary: ChangeSummary::tally(&changes),
            changes,
        }
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

/// One entry of a standalone sequence diff.
///
/// `index` is the element's position in the old sequence for removals and
/// in the new sequence otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub index: usize,
    pub value: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_display() {
        let change = Change::modified("user.age", Content::from(30), Content::from(31));
        assert_eq!(change.to_string(), "~ user.age: 30 -> 31");

        let change = Change::added("tags[2]", Content::from("x"));
        assert_eq!(change.to_string(), "+ tags[2]: \"x\"");

        let change = Change::removed("", Content::from(100));
        assert_eq!(change.to_string(), "- <root>: 100");
    }

    #[test]
    fn test_change_serialization() {
        let change = Change::added("age", Content::from(30));
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "ADDED", "path": "age", "newValue": 30})
        );
    }

    #[test]
    fn test_compare_result_from_changes() {
        let result = CompareResult::from_changes(vec![
            Change::added("a", Content::from(1)),
            Change::added("b", Content::from(2)),
            Change::removed("c", Content::from(3)),
        ]);
        assert!(result.has_changes);
        assert_eq!(result.summary.added, 2);
        assert_eq!(result.summary.removed, 1);
        assert_eq!(result.summary.modified, 0);
        assert_eq!(result.summary.total(), result.change_count());

        let empty = CompareResult::from_changes(Vec::new());
        assert!(!empty.has_changes);
        assert_eq!(empty.summary, ChangeSummary::default());
    }
}
