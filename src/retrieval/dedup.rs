//! Near-duplicate collapsing by identity key

use std::collections::HashSet;

use crate::types::RetrievedItem;

/// Keep only the first occurrence per identity key, preserving order
///
/// Pure and idempotent: applying twice yields the same list as once.
pub fn dedup_items(items: Vec<RetrievedItem>) -> Vec<RetrievedItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.identity_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExcerptItem, SummaryItem};

    fn excerpt(source: &str, page: u32, content: &str) -> RetrievedItem {
        RetrievedItem::Excerpt(ExcerptItem::new(source, content, 0.5).with_page(page))
    }

    #[test]
    fn test_first_occurrence_wins() {
        let items = vec![
            excerpt("doc1", 1, "first"),
            excerpt("doc2", 1, "other"),
            excerpt("doc1", 1, "duplicate"),
        ];

        let deduped = dedup_items(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].content(), "first");
        assert_eq!(deduped[1].content(), "other");
    }

    #[test]
    fn test_same_source_different_pages_kept() {
        let items = vec![excerpt("doc1", 1, "a"), excerpt("doc1", 2, "b")];
        assert_eq!(dedup_items(items).len(), 2);
    }

    #[test]
    fn test_summaries_dedup_on_source_alone() {
        let items = vec![
            RetrievedItem::Summary(SummaryItem::new("doc1", "first summary", 0.9)),
            RetrievedItem::Summary(SummaryItem::new("doc1", "second summary", 0.8)),
        ];

        let deduped = dedup_items(items);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].content(), "first summary");
    }

    #[test]
    fn test_idempotent() {
        let items = vec![
            excerpt("doc1", 1, "a"),
            excerpt("doc1", 1, "b"),
            excerpt("doc2", 3, "c"),
            RetrievedItem::Summary(SummaryItem::new("doc1", "s", 0.9)),
        ];

        let once = dedup_items(items);
        let twice = dedup_items(once.clone());
        let once_keys: Vec<_> = once.iter().map(|i| i.identity_key()).collect();
        let twice_keys: Vec<_> = twice.iter().map(|i| i.identity_key()).collect();
        assert_eq!(once_keys, twice_keys);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_items(Vec::new()).is_empty());
    }
}
