//! Provider abstractions for the external collaborators
//!
//! The pipeline talks to two search tiers, a generative model service, and a
//! source manifest through these traits so backends can be swapped without
//! touching the fusion or synthesis code.

pub mod llm;
pub mod manifest;
pub mod search;
pub mod vertex;

pub use llm::{classify_failure, Generation, GenerativeModel, ModelError, ModelErrorKind, TokenUsage};
pub use manifest::{ManifestCache, NullManifest, SourceManifest, SourceManifestEntry};
pub use search::SearchTier;
pub use vertex::VertexModel;
