//! Standalone sequence diff.
//!
//! Two modes:
//!
//! - Positional (`array_diff`): elements are aligned by index. Differing
//!   shared elements are `MODIFIED`, trailing extras are `ADDED` or
//!   `REMOVED`.
//! - Keyed (`array_diff_by`): elements are matched with a predicate and
//!   only arrivals and departures are reported. Changes inside matched
//!   elements are the structural differ's job.

use crate::models::{ChangeType, Content, SequenceChange};

/// Index alignment of two sequences.
pub(crate) enum Aligned<'a> {
    Both(usize, &'a Content, &'a Content),
    Added(usize, &'a Content),
    Removed(usize, &'a Content),
}

/// Align two sequences by position: shared indices first, then the new
/// sequence's extra tail, then the old sequence's extra tail.
pub(crate) fn align<'a>(
    old: &'a [Content],
    new: &'a [Content],
) -> impl Iterator<Item = Aligned<'a>> + 'a {
    let shared = old.len().min(new.len());
    let both = old
        .iter()
        .zip(new)
        .enumerate()
        .map(|(i, (a, b))| Aligned::Both(i, a, b));
    let added = new
        .iter()
        .enumerate()
        .skip(shared)
        .map(|(i, b)| Aligned::Added(i, b));
    let removed = old
        .iter()
        .enumerate()
        .skip(shared)
        .map(|(i, a)| Aligned::Removed(i, a));
    both.chain(added).chain(removed)
}

/// Positional sequence diff.
pub fn array_diff(old: &[Content], new: &[Content]) -> Vec<SequenceChange> {
    align(old, new)
        .filter_map(|aligned| match aligned {
            Aligned::Both(_, a, b) if a == b => None,
            Aligned::Both(index, _, b) => Some(entry(ChangeType::Modified, index, b)),
            Aligned::Added(index, b) => Some(entry(ChangeType::Added, index, b)),
            Aligned::Removed(index, a) => Some(entry(ChangeType::Removed, index, a)),
        })
        .collect()
}

/// Keyed sequence diff using `equals` to match elements.
///
/// Elements of `old` without any match in `new` are `REMOVED` (in old
/// order), then elements of `new` without any match in `old` are `ADDED`
/// (in new order).
pub fn array_diff_by<F>(old: &[Content], new: &[Content], equals: F) -> Vec<SequenceChange>
where
    F: Fn(&Content, &Content) -> bool,
{
    let removed = old
        .iter()
        .enumerate()
        .filter(|&(_, a)| !new.iter().any(|b| equals(a, b)))
        .map(|(index, a)| entry(ChangeType::Removed, index, a));
    let added = new
        .iter()
        .enumerate()
        .filter(|&(_, b)| !old.iter().any(|a| equals(a, b)))
        .map(|(index, b)| entry(ChangeType::Added, index, b));
    removed.chain(added).collect()
}

/// Keyed sequence diff matching elements on a mapping member, e.g. `id`.
///
/// Elements that are not mappings, or lack the member, only match
/// elements that are entirely equal to them.
pub fn array_diff_by_key(old: &[Content], new: &[Content], key: &str) -> Vec<SequenceChange> {
    array_diff_by(old, new, |a, b| match (a.get(key), b.get(key)) {
        (Some(ka), Some(kb)) => ka == kb,
        _ => a == b,
    })
}

fn entry(change_type: ChangeType, index: usize, value: &Content) -> SequenceChange {
    SequenceChange {
        change_type,
        index,
        value: value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seq(value: serde_json::Value) -> Vec<Content> {
        match Content::from(value) {
            Content::Sequence(items) => items,
            other => panic!("expected sequence, got {}", other.kind()),
        }
    }

    fn values(changes: &[SequenceChange], change_type: ChangeType) -> Vec<Content> {
        changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .map(|c| c.value.clone())
            .collect()
    }

    #[test]
    fn test_positional_additions() {
        let changes = array_diff(&seq(json!([1, 2, 3])), &seq(json!([1, 2, 3, 4, 5])));
        assert_eq!(changes.len(), 2);
        assert_eq!(
            values(&changes, ChangeType::Added),
            vec![Content::from(4), Content::from(5)]
        );
        assert_eq!(changes[0].index, 3);
        assert_eq!(changes[1].index, 4);
    }

    #[test]
    fn test_positional_removals() {
        let changes = array_diff(&seq(json!([1, 2, 3, 4, 5])), &seq(json!([1, 2, 3])));
        assert_eq!(changes.len(), 2);
        assert_eq!(
            values(&changes, ChangeType::Removed),
            vec![Content::from(4), Content::from(5)]
        );
    }

    #[test]
    fn test_positional_modification() {
        let changes = array_diff(&seq(json!(["a", "b"])), &seq(json!(["a", "c"])));
        assert_eq!(
            changes,
            vec![SequenceChange {
                change_type: ChangeType::Modified,
                index: 1,
                value: Content::from("c"),
            }]
        );
    }

    #[test]
    fn test_empty_edges() {
        let items = seq(json!([1, 2]));
        let added = array_diff(&[], &items);
        assert!(added.iter().all(|c| c.change_type == ChangeType::Added));
        assert_eq!(added.len(), 2);

        let removed = array_diff(&items, &[]);
        assert!(removed.iter().all(|c| c.change_type == ChangeType::Removed));
        assert_eq!(removed.len(), 2);

        assert!(array_diff(&items, &items).is_empty());
    }

    #[test]
    fn test_keyed_mode_ignores_reordering() {
        let old = seq(json!([{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]));
        let new = seq(json!([{"id": 2, "title": "b"}, {"id": 1, "title": "a"}]));
        assert!(array_diff_by(&old, &new, |a, b| a == b).is_empty());
    }

    #[test]
    fn test_keyed_mode_reports_arrivals_and_departures() {
        let old = seq(json!([{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]));
        let new = seq(json!([{"id": 2, "title": "B!"}, {"id": 3, "title": "c"}]));

        let changes = array_diff_by_key(&old, &new, "id");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].change_type, ChangeType::Removed);
        assert_eq!(changes[0].value.get("id"), Some(&Content::from(1)));
        assert_eq!(changes[1].change_type, ChangeType::Added);
        assert_eq!(changes[1].value.get("id"), Some(&Content::from(3)));
        assert_eq!(changes[1].index, 1);
    }

    #[test]
    fn test_keyed_mode_custom_predicate() {
        let old = seq(json!(["Apple", "banana"]));
        let new = seq(json!(["apple", "cherry"]));
        let case_insensitive = |a: &Content, b: &Content| match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
            _ => a == b,
        };

        let changes = array_diff_by(&old, &new, case_insensitive);
        assert_eq!(values(&changes, ChangeType::Removed), vec![Content::from("banana")]);
        assert_eq!(values(&changes, ChangeType::Added), vec![Content::from("cherry")]);
    }
}
