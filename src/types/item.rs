//! Retrieved item types for the two search tiers

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Location of an excerpt within its source document
///
/// Paged documents carry a page number; transcribed audio/video carries a
/// start/end time in seconds. A given corpus uses one or the other per
/// document, but both shapes are representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAnchor {
    /// Page number (1-based)
    Page(u32),
    /// Time range in seconds
    TimeRange { start_secs: f64, end_secs: f64 },
}

impl LocationAnchor {
    /// Fragment used in identity keys, stable per location
    pub fn key_fragment(&self) -> String {
        match self {
            Self::Page(page) => format!("p{}", page),
            Self::TimeRange { start_secs, end_secs } => {
                format!("t{:.0}-{:.0}", start_secs, end_secs)
            }
        }
    }

    /// Human-readable location for prompts and citations
    pub fn display(&self) -> String {
        match self {
            Self::Page(page) => format!("Page {}", page),
            Self::TimeRange { start_secs, end_secs } => {
                format!(
                    "{} - {}",
                    format_timestamp(*start_secs),
                    format_timestamp(*end_secs)
                )
            }
        }
    }
}

/// Format seconds as `H:MM:SS`, or `M:SS` under one hour
pub fn format_timestamp(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Fine-grained passage from the excerpt tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcerptItem {
    /// Identifier of the source document
    pub source_id: String,
    /// Document title, if the index carries one
    pub title: Option<String>,
    /// Original filename
    pub filename: Option<String>,
    /// Passage text
    pub content: String,
    /// Relevance score reported by the tier
    pub score: f32,
    /// Page or time anchor within the source
    pub anchor: Option<LocationAnchor>,
    /// Raw index metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Document-level description from the summary tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryItem {
    /// Identifier of the source document
    pub source_id: String,
    /// Document title, if the index carries one
    pub title: Option<String>,
    /// Original filename
    pub filename: Option<String>,
    /// Summary text
    pub summary: String,
    /// Relevance score reported by the tier
    pub score: f32,
    /// Author, if known
    pub author: Option<String>,
    /// Publishing organization, if known
    pub organization: Option<String>,
    /// Document date, if known
    pub date: Option<String>,
    /// Topic tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw index metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A retrieved item from either search tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievedItem {
    Excerpt(ExcerptItem),
    Summary(SummaryItem),
}

impl RetrievedItem {
    /// Deduplication key: source + location for excerpts, source alone for
    /// summaries. Unique within a result set after dedup.
    pub fn identity_key(&self) -> String {
        match self {
            Self::Excerpt(e) => match &e.anchor {
                Some(anchor) => format!("{}#{}", e.source_id, anchor.key_fragment()),
                None => format!("{}#-", e.source_id),
            },
            Self::Summary(s) => s.source_id.clone(),
        }
    }

    /// Source document identifier
    pub fn source_id(&self) -> &str {
        match self {
            Self::Excerpt(e) => &e.source_id,
            Self::Summary(s) => &s.source_id,
        }
    }

    /// Title, if the index carries one
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Excerpt(e) => e.title.as_deref(),
            Self::Summary(s) => s.title.as_deref(),
        }
    }

    /// Item text (passage content or summary)
    pub fn content(&self) -> &str {
        match self {
            Self::Excerpt(e) => &e.content,
            Self::Summary(s) => &s.summary,
        }
    }

    /// Relevance score reported by the tier
    pub fn score(&self) -> f32 {
        match self {
            Self::Excerpt(e) => e.score,
            Self::Summary(s) => s.score,
        }
    }

    /// Whether this item came from the excerpt tier
    pub fn is_excerpt(&self) -> bool {
        matches!(self, Self::Excerpt(_))
    }
}

impl ExcerptItem {
    /// Minimal excerpt for construction in callers and tests
    pub fn new(source_id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            source_id: source_id.into(),
            title: None,
            filename: None,
            content: content.into(),
            score,
            anchor: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the page anchor
    pub fn with_page(mut self, page: u32) -> Self {
        self.anchor = Some(LocationAnchor::Page(page));
        self
    }

    /// Set the time-range anchor
    pub fn with_time_range(mut self, start_secs: f64, end_secs: f64) -> Self {
        self.anchor = Some(LocationAnchor::TimeRange { start_secs, end_secs });
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

impl SummaryItem {
    /// Minimal summary for construction in callers and tests
    pub fn new(source_id: impl Into<String>, summary: impl Into<String>, score: f32) -> Self {
        Self {
            source_id: source_id.into(),
            title: None,
            filename: None,
            summary: summary.into(),
            score,
            author: None,
            organization: None,
            date: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
