//! Recursive structural diff of two structured values.
//!
//! Produces an ordered list of path-addressed changes:
//!
//! - Mappings: shared keys recurse at `path.key` (or `path["key"]` when
//!   the key is empty or contains `.`, `[`, `]` or `"`), old-only keys are
//!   `REMOVED`, new-only keys are `ADDED`. Old keys are visited first,
//!   then new-only keys, each in sorted order.
//! - Sequences: shared indices recurse at `path[i]`; extra trailing
//!   indices are `ADDED` or `REMOVED` in index order.
//! - Scalars, and values of different kinds, produce a single `MODIFIED`
//!   at the current path. `null`/absent to a value (or back) is a
//!   modification of the slot, not a removal plus an addition.
//!
//! Equal subtrees never produce changes, so `diff(v, v)` is empty.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{Change, Content};

use super::sequence::{Aligned, align};

/// Compute the changes that turn `old` into `new`.
pub fn diff(old: &Content, new: &Content) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_at(old, new, "", &mut changes);
    changes
}

/// Path of a mapping member.
///
/// Keys that would read as path syntax are quoted in brackets, so a
/// member `"a.b"` never shares a path with member `b` of member `a`.
fn key_path(path: &str, key: &str) -> String {
    if key.is_empty() || key.contains(['.', '[', ']', '"']) {
        format!("{}[{}]", path, Value::from(key))
    } else if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Path of a sequence element.
fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

fn diff_at(old: &Content, new: &Content, path: &str, changes: &mut Vec<Change>) {
    match (old, new) {
        (Content::Mapping(old_map), Content::Mapping(new_map)) => {
            diff_mappings(old_map, new_map, path, changes);
        }
        (Content::Sequence(old_items), Content::Sequence(new_items)) => {
            diff_sequences(old_items, new_items, path, changes);
        }
        // Equal scalars, or a kind mismatch handled as one replacement.
        _ if old == new => {}
        _ => changes.push(Change::modified(path, old.clone(), new.clone())),
    }
}

fn diff_mappings(
    old: &BTreeMap<String, Content>,
    new: &BTreeMap<String, Content>,
    path: &str,
    changes: &mut Vec<Change>,
) {
    for (key, old_value) in old {
        let child = key_path(path, key);
        match new.get(key) {
            Some(new_value) => diff_at(old_value, new_value, &child, changes),
            None => changes.push(Change::removed(child, old_value.clone())),
        }
    }

    for (key, new_value) in new.iter().filter(|(k, _)| !old.contains_key(*k)) {
        changes.push(Change::added(key_path(path, key), new_value.clone()));
    }
}

fn diff_sequences(old: &[Content], new: &[Content], path: &str, changes: &mut Vec<Change>) {
    for aligned in align(old, new) {
        match aligned {
            Aligned::Both(i, a, b) => diff_at(a, b, &index_path(path, i), changes),
            Aligned::Added(i, b) => changes.push(Change::added(index_path(path, i), b.clone())),
            Aligned::Removed(i, a) => {
                changes.push(Change::removed(index_path(path, i), a.clone()))
            }
        }
    }
}
