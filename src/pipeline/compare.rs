//! Snapshot comparison.
//!
//! Wraps the structural differ for two whole snapshots and tallies the
//! result. Pure: does not touch tracker state.
//!
//! Always runs the differ. Equal hashes do not imply an empty diff: the
//! canonical form renders absent slots like `null`, while the differ
//! tells them apart.

use crate::models::{CompareResult, Snapshot};

use super::diff::diff;

/// Compare the content of two snapshots, `a` being the older one.
pub fn compare(a: &Snapshot, b: &Snapshot) -> CompareResult {
    CompareResult::from_changes(diff(a.content(), b.content()))
}
