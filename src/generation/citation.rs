//! Citation extraction and placeholder label normalization
//!
//! Two passes over the raw answer: first rewrite `Document N` / `Chunk N`
//! placeholders to the real titles of the prompt's context items, then
//! collect the distinct bracketed citations.

use std::collections::HashMap;

use regex::Regex;

use crate::types::{ExcerptItem, SummaryItem};

/// Bracketed spans longer than this are treated as accidentally-bracketed
/// prose, not citations.
pub const MAX_CITATION_CHARS: usize = 200;

/// Rewrite placeholder labels and extract the citation list
pub fn extract_and_normalize(
    answer: &str,
    summaries: &[SummaryItem],
    excerpts: &[ExcerptItem],
) -> (String, Vec<String>) {
    let labels = build_label_map(summaries, excerpts);
    let rewritten = rewrite_labels(answer, &labels);
    let citations = extract_citations(&rewritten);
    (rewritten, citations)
}

/// Map `Document N` / `Chunk N` labels to item titles, 1-based per list
///
/// Items without a title or filename get no entry; their placeholders stay
/// unrewritten rather than mapping to something meaningless.
pub fn build_label_map(
    summaries: &[SummaryItem],
    excerpts: &[ExcerptItem],
) -> HashMap<String, String> {
    let mut labels = HashMap::new();

    for (i, summary) in summaries.iter().enumerate() {
        if let Some(title) = summary.title.as_deref().or(summary.filename.as_deref()) {
            labels.insert(format!("Document {}", i + 1), title.to_string());
        }
    }
    for (i, excerpt) in excerpts.iter().enumerate() {
        if let Some(title) = excerpt.title.as_deref().or(excerpt.filename.as_deref()) {
            labels.insert(format!("Chunk {}", i + 1), title.to_string());
        }
    }

    labels
}

/// Replace placeholder tokens anywhere in the answer with real titles
///
/// A placeholder with no label map entry is left exactly as written.
pub fn rewrite_labels(answer: &str, labels: &HashMap<String, String>) -> String {
    let pattern = Regex::new(r"\b(Document|Chunk)\s+(\d+)\b").expect("Invalid regex");

    pattern
        .replace_all(answer, |caps: &regex::Captures| {
            let key = format!("{} {}", &caps[1], &caps[2]);
            match labels.get(&key) {
                Some(title) => title.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Collect distinct bracketed citations in first-seen order
///
/// Spans at or above the sanity threshold are skipped; duplicates by exact
/// text are dropped.
pub fn extract_citations(answer: &str) -> Vec<String> {
    let pattern = Regex::new(r"\[([^\[\]]+)\]").expect("Invalid regex");

    let mut seen = std::collections::HashSet::new();
    let mut citations = Vec::new();

    for caps in pattern.captures_iter(answer) {
        let text = caps[1].trim();
        if text.is_empty() || text.chars().count() >= MAX_CITATION_CHARS {
            continue;
        }
        if seen.insert(text.to_string()) {
            citations.push(text.to_string());
        }
    }

    citations
}
