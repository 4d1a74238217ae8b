//! Retrieval-fusion and citation-grounded answer synthesis
//!
//! The pipeline expands a question into alternate phrasings, retrieves ranked
//! results from an excerpt tier and a summary tier, fuses the per-variant
//! rankings with reciprocal rank fusion, reranks with a utility model, fits
//! the survivors into a token budget, and synthesizes an answer through an
//! ordered model fallback chain. Citations are extracted from the answer,
//! placeholder labels are rewritten to real document titles, and the cited
//! sources are attributed with page ranges, time ranges, and browsable URLs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fusion_rag::config::PipelineConfig;
//! use fusion_rag::pipeline::AnswerPipeline;
//! use fusion_rag::providers::NullManifest;
//! use fusion_rag::tracking::UsageTracker;
//! use fusion_rag::types::AnswerRequest;
//!
//! # async fn run(
//! #     excerpt_tier: Arc<dyn fusion_rag::providers::SearchTier>,
//! #     summary_tier: Arc<dyn fusion_rag::providers::SearchTier>,
//! #     model: Arc<dyn fusion_rag::providers::GenerativeModel>,
//! # ) -> fusion_rag::error::Result<()> {
//! let pipeline = AnswerPipeline::new(
//!     PipelineConfig::default(),
//!     excerpt_tier,
//!     summary_tier,
//!     model,
//!     Arc::new(NullManifest),
//!     Arc::new(UsageTracker::new()),
//! )?;
//!
//! let response = pipeline.answer(AnswerRequest::new("What is AML?")).await?;
//! println!("{}", response.answer);
//! for source in &response.sources {
//!     println!("  {} (pages {})", source.title, source.page_range);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod tracking;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::AnswerPipeline;
pub use tracking::UsageTracker;
pub use types::{AnswerRequest, AnswerResponse, RetrievedItem, SourceRecord};
