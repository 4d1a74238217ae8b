//! Retrieval: expansion, two-tier search, dedup, fusion, reranking

pub mod dedup;
pub mod expand;
pub mod fusion;
pub mod rerank;
pub mod search;

pub use dedup::dedup_items;
pub use expand::QueryExpander;
pub use fusion::{fuse, fuse_with_scores, DEFAULT_RRF_K};
pub use rerank::Reranker;
pub use search::{adaptive_limits, RetrievalLimits, TierLists, TwoTierRetriever};
