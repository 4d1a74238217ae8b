//! Answer request types

use serde::{Deserialize, Serialize};

/// Role of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Label used in the prompt transcript
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One prior turn of the active conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a cited answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The question to answer
    pub question: String,

    /// Expand the query into alternate phrasings (default: true)
    #[serde(default = "default_true")]
    pub expand: bool,

    /// Rerank fused results with the model (default: true)
    #[serde(default = "default_true")]
    pub rerank: bool,

    /// Optional filter expression passed through to both tiers
    #[serde(default)]
    pub filter: Option<String>,

    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

fn default_true() -> bool {
    true
}

impl AnswerRequest {
    /// Create a request with default options
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            expand: true,
            rerank: true,
            filter: None,
            history: Vec::new(),
        }
    }

    /// Disable query expansion
    pub fn without_expansion(mut self) -> Self {
        self.expand = false;
        self
    }

    /// Disable model reranking
    pub fn without_rerank(mut self) -> Self {
        self.rerank = false;
        self
    }

    /// Set a tier filter expression
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Attach prior conversation turns
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}
