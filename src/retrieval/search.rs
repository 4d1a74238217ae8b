//! Two-tier retrieval with adaptive result limits

use std::sync::Arc;

use crate::providers::SearchTier;
use crate::types::RetrievedItem;

/// Per-tier result caps for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalLimits {
    pub max_excerpts: usize,
    pub max_summaries: usize,
}

/// Map query complexity to result caps
///
/// Shorter queries request fewer results; the word count is the primary
/// signal. Thresholds: under 5 words 5/3, under 15 words 10/5, else 15/7.
pub fn adaptive_limits(query: &str) -> RetrievalLimits {
    let word_count = query.split_whitespace().count();
    if word_count < 5 {
        RetrievalLimits {
            max_excerpts: 5,
            max_summaries: 3,
        }
    } else if word_count < 15 {
        RetrievalLimits {
            max_excerpts: 10,
            max_summaries: 5,
        }
    } else {
        RetrievalLimits {
            max_excerpts: 15,
            max_summaries: 7,
        }
    }
}

/// Per-variant ranked lists for both tiers
///
/// `excerpts[i]` and `summaries[i]` hold the results for variant `i`; a
/// failed tier call contributes an empty list at its position.
#[derive(Debug, Default)]
pub struct TierLists {
    pub excerpts: Vec<Vec<RetrievedItem>>,
    pub summaries: Vec<Vec<RetrievedItem>>,
}

/// Issues per-variant queries against both search tiers
pub struct TwoTierRetriever {
    excerpt_tier: Arc<dyn SearchTier>,
    summary_tier: Arc<dyn SearchTier>,
}

impl TwoTierRetriever {
    /// Create a retriever over the two tier instances
    pub fn new(excerpt_tier: Arc<dyn SearchTier>, summary_tier: Arc<dyn SearchTier>) -> Self {
        Self {
            excerpt_tier,
            summary_tier,
        }
    }

    /// Retrieve ranked lists for every variant from both tiers
    ///
    /// All variant/tier calls run concurrently; fusion downstream waits on
    /// the full set. A single failed call is logged and yields an empty list
    /// without aborting the rest.
    pub async fn retrieve(
        &self,
        variants: &[String],
        limits: RetrievalLimits,
        filter: Option<&str>,
    ) -> TierLists {
        let filter = filter.map(|f| f.to_string());

        let futures = variants.iter().map(|variant| {
            let excerpt_tier = Arc::clone(&self.excerpt_tier);
            let summary_tier = Arc::clone(&self.summary_tier);
            let filter = filter.clone();
            let variant = variant.clone();

            async move {
                let (excerpts, summaries) = tokio::join!(
                    excerpt_tier.search(&variant, limits.max_excerpts, filter.as_deref()),
                    summary_tier.search(&variant, limits.max_summaries, filter.as_deref()),
                );
                (
                    tolerate_failure(excerpts, excerpt_tier.name(), &variant),
                    tolerate_failure(summaries, summary_tier.name(), &variant),
                )
            }
        });

        let mut lists = TierLists::default();
        for (excerpts, summaries) in futures::future::join_all(futures).await {
            lists.excerpts.push(excerpts);
            lists.summaries.push(summaries);
        }
        lists
    }
}

/// A failed tier call contributes an empty list, never an abort
fn tolerate_failure(
    result: crate::error::Result<Vec<RetrievedItem>>,
    tier: &str,
    variant: &str,
) -> Vec<RetrievedItem> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                "Tier '{}' failed for variant \"{}\": {} (continuing with empty list)",
                tier,
                variant,
                e
            );
            Vec::new()
        }
    }
}
