//! Set helpers for matching users and roles against reference lists.

use std::collections::HashSet;
use std::hash::Hash;

/// Build a lookup set from a stored id list.
pub fn to_set<T: Eq + Hash>(ids: Vec<T>) -> HashSet<T> {
    ids.into_iter().collect()
}

/// Whether any of `candidates` is present in `set`.
pub fn intersects<T: Eq + Hash>(set: &HashSet<T>, candidates: &[T]) -> bool {
    !set.is_empty() && candidates.iter().any(|id| set.contains(id))
}

/// Whether any of `candidates` appears in an unindexed id list.
///
/// Used for one-shot checks where building a set costs more than the scan.
pub fn any_in<T: PartialEq>(ids: &[T], candidates: &[T]) -> bool {
    candidates.iter().any(|id| ids.contains(id))
}
