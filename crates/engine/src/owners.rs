//! Ownership joins: which dependents does a controller manage?

use pano_core::{HasMeta, Uid};

/// Candidates whose controller owner reference points at `owner`. Order is
/// preserved; no match yields an empty vec.
pub fn owned_by<T: HasMeta>(owner: Uid, candidates: &[T]) -> Vec<&T> {
    candidates
        .iter()
        .filter(|c| {
            c.meta()
                .owner_refs
                .iter()
                .any(|r| r.controller && r.uid == owner)
        })
        .collect()
}
