//! Computes the difference between two storage layouts of the same contract.

use crate::layout::StorageRecord;
use std::collections::{BTreeMap, BTreeSet};

/// The difference between the old and new storage layout of one contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutDiff {
    /// Variables whose `(label, type)` no longer exists in the new layout,
    /// in full-tuple order.
    pub removed: BTreeSet<StorageRecord>,
    /// Variables whose `(label, type)` did not exist in the old layout,
    /// in full-tuple order.
    pub added: BTreeSet<StorageRecord>,
    /// Variables present in both layouts at different coordinates, ordered by
    /// the old record's `(slot, offset)`.
    pub moved: Vec<(StorageRecord, StorageRecord)>,
}

impl LayoutDiff {
    /// Whether the two layouts are equivalent as record sets.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.moved.is_empty()
    }
}

/// Diffs two layouts of the same contract.
///
/// With `detect_moves`, a variable present in both layouts under the same
/// `(label, type)` but at different coordinates is reported as a single move
/// rather than a removal plus an addition, distinguishing a relocation from a
/// genuinely deleted or introduced variable. Duplicate `(label, type)` keys
/// within one layout resolve to the last occurrence.
pub fn diff_layouts(old: &[StorageRecord], new: &[StorageRecord], detect_moves: bool) -> LayoutDiff {
    let old_set: BTreeSet<_> = old.iter().cloned().collect();
    let new_set: BTreeSet<_> = new.iter().cloned().collect();
    let mut removed: BTreeSet<_> = old_set.difference(&new_set).cloned().collect();
    let mut added: BTreeSet<_> = new_set.difference(&old_set).cloned().collect();

    let mut moved = Vec::new();
    if detect_moves {
        let old_by_key: BTreeMap<_, _> = old.iter().map(|r| (r.var_key(), r)).collect();
        let new_by_key: BTreeMap<_, _> = new.iter().map(|r| (r.var_key(), r)).collect();
        for (key, old_rec) in &old_by_key {
            let Some(new_rec) = new_by_key.get(key) else { continue };
            if (old_rec.slot, old_rec.offset) != (new_rec.slot, new_rec.offset) {
                removed.remove(*old_rec);
                added.remove(*new_rec);
                moved.push(((*old_rec).clone(), (*new_rec).clone()));
            }
        }
        moved.sort_by_key(|(old_rec, _)| (old_rec.slot, old_rec.offset));
    }

    LayoutDiff { removed, added, moved }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slot: u64, offset: u64, label: &str, ty: &str) -> StorageRecord {
        StorageRecord { slot, offset, label: label.to_string(), ty: ty.to_string() }
    }

    #[test]
    fn disjoint_layouts_diff_to_removals_and_additions() {
        let old = vec![record(0, 0, "a", "t_uint256"), record(1, 0, "b", "t_bool")];
        let new = vec![record(0, 0, "c", "t_address")];
        let diff = diff_layouts(&old, &new, true);
        assert_eq!(diff.removed, old.iter().cloned().collect());
        assert_eq!(diff.added, new.iter().cloned().collect());
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn permutations_diff_to_nothing() {
        let old = vec![record(0, 0, "a", "t_uint256"), record(1, 0, "b", "t_bool")];
        let new = vec![old[1].clone(), old[0].clone()];
        assert!(diff_layouts(&old, &new, true).is_empty());
        assert!(diff_layouts(&old, &new, false).is_empty());
    }

    #[test]
    fn diff_against_self_is_empty() {
        let layout = vec![record(0, 0, "a", "t_uint256"), record(0, 16, "b", "t_uint128")];
        assert!(diff_layouts(&layout, &layout, true).is_empty());
    }

    #[test]
    fn relocation_is_a_move_not_a_removal_plus_addition() {
        let old = vec![record(1, 0, "x", "uint256")];
        let new = vec![record(2, 0, "x", "uint256")];
        let diff = diff_layouts(&old, &new, true);
        assert_eq!(diff.moved, vec![(old[0].clone(), new[0].clone())]);
        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());
    }

    #[test]
    fn relocation_without_move_detection() {
        let old = vec![record(1, 0, "x", "uint256")];
        let new = vec![record(2, 0, "x", "uint256")];
        let diff = diff_layouts(&old, &new, false);
        assert!(diff.moved.is_empty());
        assert_eq!(diff.removed, old.iter().cloned().collect());
        assert_eq!(diff.added, new.iter().cloned().collect());
    }

    #[test]
    fn offset_changes_count_as_moves() {
        let old = vec![record(0, 0, "x", "t_uint128")];
        let new = vec![record(0, 16, "x", "t_uint128")];
        let diff = diff_layouts(&old, &new, true);
        assert_eq!(diff.moved.len(), 1);
        assert!(diff.removed.is_empty() && diff.added.is_empty());
    }

    #[test]
    fn moves_are_ordered_by_old_coordinates() {
        let old = vec![record(5, 0, "b", "t_bool"), record(1, 0, "a", "t_uint256")];
        let new = vec![record(6, 0, "b", "t_bool"), record(2, 0, "a", "t_uint256")];
        let diff = diff_layouts(&old, &new, true);
        let labels: Vec<_> = diff.moved.iter().map(|(o, _)| o.label.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn type_change_is_not_a_move() {
        // Same label, different type: the variable was redeclared, not moved.
        let old = vec![record(0, 0, "x", "t_uint256")];
        let new = vec![record(1, 0, "x", "t_uint128")];
        let diff = diff_layouts(&old, &new, true);
        assert!(diff.moved.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
    }
}
