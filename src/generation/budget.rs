//! Context-window budgeting across summary and excerpt items

use serde::{Deserialize, Serialize};

use crate::types::{ExcerptItem, SummaryItem};

/// Marker appended to content truncated to fit the budget
const TRUNCATION_MARKER: &str = "...";

/// Token budget configuration, estimated at four characters per token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Total context budget in estimated tokens
    #[serde(default = "default_total_tokens")]
    pub total_tokens: usize,
    /// Tokens reserved for prompt scaffolding
    #[serde(default = "default_reserved_overhead")]
    pub reserved_overhead: usize,
    /// Fraction of the remaining budget given to summaries
    #[serde(default = "default_summary_share")]
    pub summary_share: f64,
    /// Minimum useful size for a truncated summary
    #[serde(default = "default_min_summary_tokens")]
    pub min_summary_tokens: usize,
    /// Minimum useful size for a truncated excerpt
    #[serde(default = "default_min_excerpt_tokens")]
    pub min_excerpt_tokens: usize,
}

fn default_total_tokens() -> usize {
    24_000
}
fn default_reserved_overhead() -> usize {
    2_000
}
fn default_summary_share() -> f64 {
    0.2
}
fn default_min_summary_tokens() -> usize {
    100
}
fn default_min_excerpt_tokens() -> usize {
    200
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_tokens: default_total_tokens(),
            reserved_overhead: default_reserved_overhead(),
            summary_share: default_summary_share(),
            min_summary_tokens: default_min_summary_tokens(),
            min_excerpt_tokens: default_min_excerpt_tokens(),
        }
    }
}

/// Estimate tokens as character count divided by four
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Allocate the token budget across both item lists
///
/// Each output list is a prefix (by relevance order) of its input; the last
/// kept item may be truncated to fit, and later items are dropped entirely.
pub fn apply_budget(
    config: &BudgetConfig,
    summaries: Vec<SummaryItem>,
    excerpts: Vec<ExcerptItem>,
) -> (Vec<SummaryItem>, Vec<ExcerptItem>) {
    let available = config
        .total_tokens
        .saturating_sub(config.reserved_overhead);
    let summary_budget = (available as f64 * config.summary_share) as usize;
    let excerpt_budget = available.saturating_sub(summary_budget);

    let summaries = fit_list(
        summaries,
        summary_budget,
        config.min_summary_tokens,
        |item| &item.summary,
        |item, text| item.summary = text,
    );
    let excerpts = fit_list(
        excerpts,
        excerpt_budget,
        config.min_excerpt_tokens,
        |item| &item.content,
        |item, text| item.content = text,
    );

    (summaries, excerpts)
}

/// Walk a list in order, accumulating estimated tokens against a sub-budget
fn fit_list<T>(
    items: Vec<T>,
    budget: usize,
    min_tokens: usize,
    text: impl Fn(&T) -> &str,
    set_text: impl Fn(&mut T, String),
) -> Vec<T> {
    let mut kept = Vec::new();
    let mut used = 0usize;

    for mut item in items {
        let cost = estimate_tokens(text(&item));
        if used + cost <= budget {
            used += cost;
            kept.push(item);
            continue;
        }

        let remaining = budget.saturating_sub(used);
        if remaining >= min_tokens {
            let truncated = truncate_to_tokens(text(&item), remaining);
            set_text(&mut item, truncated);
            kept.push(item);
        }
        // Later items are dropped entirely once the sub-budget is exhausted.
        break;
    }

    kept
}

/// Truncate to an estimated token count, appending the ellipsis marker
fn truncate_to_tokens(text: &str, tokens: usize) -> String {
    let max_chars = tokens * 4;
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}{}", truncated, TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(chars: usize) -> SummaryItem {
        SummaryItem::new("doc", "s".repeat(chars), 0.9)
    }

    fn excerpt(chars: usize) -> ExcerptItem {
        ExcerptItem::new("doc", "e".repeat(chars), 0.9)
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn test_everything_fits_unchanged() {
        let config = BudgetConfig::default();
        let (summaries, excerpts) =
            apply_budget(&config, vec![summary(400)], vec![excerpt(800)]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(excerpts.len(), 1);
        assert!(!summaries[0].summary.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_overflow_item_truncated_with_marker() {
        let config = BudgetConfig {
            total_tokens: 3_000,
            reserved_overhead: 1_000,
            ..Default::default()
        };
        // Summary budget: 400 tokens. First item consumes 300, second (300)
        // overflows but the 100-token remainder meets the minimum.
        let (summaries, _) = apply_budget(
            &config,
            vec![summary(1200), summary(1200), summary(1200)],
            Vec::new(),
        );

        assert_eq!(summaries.len(), 2);
        assert!(summaries[1].summary.ends_with(TRUNCATION_MARKER));
        assert_eq!(estimate_tokens(&summaries[1].summary), 100);
    }

    #[test]
    fn test_tiny_remainder_drops_item() {
        let config = BudgetConfig {
            total_tokens: 3_000,
            reserved_overhead: 1_000,
            ..Default::default()
        };
        // 390 of the 400 summary tokens used: the 10-token remainder is
        // below the 100-token minimum, so the next item is dropped.
        let (summaries, _) = apply_budget(
            &config,
            vec![summary(1560), summary(1200)],
            Vec::new(),
        );
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn test_budget_never_exceeded() {
        let config = BudgetConfig::default();
        let summaries: Vec<_> = (0..200).map(|_| summary(2_000)).collect();
        let excerpts: Vec<_> = (0..200).map(|_| excerpt(4_000)).collect();

        let (kept_summaries, kept_excerpts) = apply_budget(&config, summaries, excerpts);

        let total: usize = kept_summaries
            .iter()
            .map(|s| estimate_tokens(&s.summary))
            .chain(kept_excerpts.iter().map(|e| estimate_tokens(&e.content)))
            .sum();
        assert!(total + config.reserved_overhead <= config.total_tokens + 1);
    }

    #[test]
    fn test_output_is_prefix_of_input() {
        let config = BudgetConfig {
            total_tokens: 4_000,
            reserved_overhead: 2_000,
            ..Default::default()
        };
        let excerpts: Vec<_> = (0..10)
            .map(|i| ExcerptItem::new(format!("doc{}", i), "e".repeat(2_000), 0.9))
            .collect();

        let (_, kept) = apply_budget(&config, Vec::new(), excerpts);
        for (i, item) in kept.iter().enumerate() {
            assert_eq!(item.source_id, format!("doc{}", i));
        }
        assert!(kept.len() < 10);
    }
}
