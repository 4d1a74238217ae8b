//! Search tier provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievedItem;

/// Trait for one search tier of the corpus index
///
/// The pipeline queries two independent instances: an excerpt tier returning
/// fine-grained passages with a page/time anchor, and a summary tier returning
/// document-level descriptions. Implementations must tolerate empty results.
#[async_trait]
pub trait SearchTier: Send + Sync {
    /// Search the tier, returning up to `limit` items ordered by relevance
    /// (rank 1 first). `filter` is an optional tier-specific filter
    /// expression passed through verbatim.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&str>,
    ) -> Result<Vec<RetrievedItem>>;

    /// Tier name for logging ("excerpt", "summary")
    fn name(&self) -> &str;
}
