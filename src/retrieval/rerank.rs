//! Model-based relevance reranking of fused results

use std::sync::Arc;

use crate::providers::GenerativeModel;
use crate::types::RetrievedItem;

/// Content preview length per item in the scoring prompt, in characters
const SNIPPET_PREVIEW_CHARS: usize = 400;

/// Reorders retrieved items by model-judged relevance
///
/// Reranking is best-effort: every item survives (unmentioned indices are
/// appended in original order) and a model failure falls back to the
/// pre-rerank order. The cap, when given, applies after reordering.
pub struct Reranker {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
}

impl Reranker {
    /// Create a reranker using the given candidate model
    pub fn new(model: Arc<dyn GenerativeModel>, model_id: String) -> Self {
        Self { model, model_id }
    }

    /// Rerank items against the query, then apply the cap
    pub async fn rerank(
        &self,
        query: &str,
        items: Vec<RetrievedItem>,
        cap: Option<usize>,
    ) -> Vec<RetrievedItem> {
        if items.len() < 2 {
            return apply_cap(items, cap);
        }

        let prompt = build_scoring_prompt(query, &items);
        let order = match self.model.generate(&self.model_id, &prompt, 0.0, 128).await {
            Ok(generation) => parse_index_order(&generation.text, items.len()),
            Err(e) => {
                tracing::warn!("Reranking failed, keeping fused order: {}", e);
                return apply_cap(items, cap);
            }
        };

        let mut slots: Vec<Option<RetrievedItem>> = items.into_iter().map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for index in order {
            if let Some(item) = slots[index].take() {
                reordered.push(item);
            }
        }
        // Anything the model failed to mention keeps its original order.
        for slot in slots {
            if let Some(item) = slot {
                reordered.push(item);
            }
        }

        apply_cap(reordered, cap)
    }
}

fn apply_cap(mut items: Vec<RetrievedItem>, cap: Option<usize>) -> Vec<RetrievedItem> {
    if let Some(cap) = cap {
        items.truncate(cap);
    }
    items
}

/// Scoring prompt listing indexed content previews
fn build_scoring_prompt(query: &str, items: &[RetrievedItem]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Order the numbered passages below from most to least relevant to the question.\n",
    );
    prompt.push_str("Respond with the passage numbers only, comma-separated.\n\n");
    prompt.push_str(&format!("Question: {}\n\nPassages:\n", query));

    for (i, item) in items.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] {}\n",
            i + 1,
            truncate_preview(item.content(), SNIPPET_PREVIEW_CHARS)
        ));
    }

    prompt
}

/// Truncate to a character budget, respecting char boundaries
fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

/// Parse a comma-separated index ordering from the model response
///
/// Indices are 1-based in the prompt; out-of-range values are ignored and
/// repeats keep their first position. Returns 0-based indices.
fn parse_index_order(response: &str, len: usize) -> Vec<usize> {
    let mut seen = vec![false; len];
    let mut order = Vec::new();

    for token in response.split(|c: char| !c.is_ascii_digit()) {
        if token.is_empty() {
            continue;
        }
        let Ok(number) = token.parse::<usize>() else {
            continue;
        };
        if number == 0 || number > len {
            continue;
        }
        let index = number - 1;
        if !seen[index] {
            seen[index] = true;
            order.push(index);
        }
    }

    order
}
