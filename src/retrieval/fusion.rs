//! Reciprocal Rank Fusion across query-variant result lists
//!
//! Scores an item by the sum of `1/(rank + k)` over every variant list in
//! which it appears, merging ranked lists without normalizing tier scores.

use std::collections::HashMap;

use crate::types::RetrievedItem;

/// Default RRF smoothing constant; higher values flatten the influence of
/// top ranks from any single list.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Fuse the per-variant ranked lists of one tier, returning items with their
/// accumulated RRF scores, sorted by descending score.
///
/// The payload kept for an identity key is the first entry encountered for it
/// (scanning lists in order, ranks top-down) while scores accumulate across
/// every appearance. The sort is stable, so ties keep first-seen order.
pub fn fuse_with_scores(
    ranked_lists: &[Vec<RetrievedItem>],
    k: f64,
) -> Vec<(RetrievedItem, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut entries: HashMap<String, (RetrievedItem, f64)> = HashMap::new();

    for list in ranked_lists {
        for (index, item) in list.iter().enumerate() {
            let rank = (index + 1) as f64;
            let contribution = 1.0 / (rank + k);
            let key = item.identity_key();

            match entries.get_mut(&key) {
                Some((_, score)) => *score += contribution,
                None => {
                    order.push(key.clone());
                    entries.insert(key, (item.clone(), contribution));
                }
            }
        }
    }

    let mut fused: Vec<(RetrievedItem, f64)> = order
        .into_iter()
        .filter_map(|key| entries.remove(&key))
        .collect();

    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused
}

/// Fuse the per-variant ranked lists of one tier into a single ordered list
pub fn fuse(ranked_lists: &[Vec<RetrievedItem>], k: f64) -> Vec<RetrievedItem> {
    fuse_with_scores(ranked_lists, k)
        .into_iter()
        .map(|(item, _)| item)
        .collect()
}
