//! Query expansion into alternate phrasings

use std::sync::Arc;

use crate::providers::GenerativeModel;

/// Maximum number of model-produced alternates kept per query
const MAX_ALTERNATES: usize = 3;

/// Expands a query into alternate phrasings via the generative model
///
/// Expansion failure is never fatal: the caller always gets at least the
/// original query back.
pub struct QueryExpander {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
}

impl QueryExpander {
    /// Create an expander using the given candidate model
    pub fn new(model: Arc<dyn GenerativeModel>, model_id: String) -> Self {
        Self { model, model_id }
    }

    /// Produce query variants, the original always first
    pub async fn expand(&self, query: &str) -> Vec<String> {
        let prompt = build_expansion_prompt(query);

        let response = match self
            .model
            .generate(&self.model_id, &prompt, 0.4, 256)
            .await
        {
            Ok(generation) => generation.text,
            Err(e) => {
                tracing::warn!("Query expansion failed, using original query only: {}", e);
                return vec![query.to_string()];
            }
        };

        let mut variants = vec![query.to_string()];
        for line in response.lines() {
            let phrasing = strip_list_marker(line).trim();
            if phrasing.is_empty() {
                continue;
            }
            if phrasing.eq_ignore_ascii_case(query) {
                continue;
            }
            variants.push(phrasing.to_string());
            if variants.len() > MAX_ALTERNATES {
                break;
            }
        }

        tracing::debug!("Expanded query into {} variant(s)", variants.len());
        variants
    }
}

/// Instruction asking for 2-3 rephrasings, one per line
fn build_expansion_prompt(query: &str) -> String {
    format!(
        "Rewrite the question below into 2-3 alternate phrasings that could match \
different wording in a document corpus. Expand abbreviations and use synonyms \
where natural. Return one phrasing per line with no numbering or commentary.\n\n\
Question: {query}"
    )
}

/// Strip leading list markup ("1.", "2)", "-", "*") from a model line
fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    let after_digits = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < trimmed.len() {
        if let Some(rest) = after_digits
            .strip_prefix('.')
            .or_else(|| after_digits.strip_prefix(')'))
        {
            return rest;
        }
        // Bare number with no separator: treat the line as-is.
        return trimmed;
    }
    trimmed
        .trim_start_matches(['-', '*'])
        .trim_start_matches(' ')
}
