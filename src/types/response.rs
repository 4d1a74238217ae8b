//! Response types for answered queries

use serde::{Deserialize, Serialize};

/// A time range cited from a transcribed source, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSegment {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeSegment {
    /// Human-readable `start - end` form
    pub fn display(&self) -> String {
        format!(
            "{} - {}",
            crate::types::item::format_timestamp(self.start_secs),
            crate::types::item::format_timestamp(self.end_secs)
        )
    }
}

/// Per-document attribution aggregated across all items used in synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source document identifier
    pub source_id: String,
    /// Display title
    pub title: String,
    /// Original filename, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Browsable URL for the document, if resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Pages cited, ascending and unique after finalization
    #[serde(default)]
    pub pages: Vec<u32>,
    /// Time ranges cited, for transcribed sources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_ranges: Vec<TimeSegment>,
    /// Compact page-range string, e.g. "1-3, 5-6, 10"
    #[serde(default)]
    pub page_range: String,
}

/// Final pipeline output: answer text plus citation and source lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Generated answer with normalized citation labels
    pub answer: String,
    /// Distinct inline citations in first-seen order
    pub citations: Vec<String>,
    /// Sources actually referenced by the citations
    pub sources: Vec<SourceRecord>,
    /// Model that produced the answer, or "fallback-none"
    pub model_used: String,
    /// Number of summaries included in the prompt
    pub summaries_used: usize,
    /// Number of excerpts included in the prompt
    pub excerpts_used: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
