//! Pipeline configuration, loadable from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generation::BudgetConfig;
use crate::retrieval::DEFAULT_RRF_K;

/// Retrieval-stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Rank-smoothing constant for reciprocal rank fusion
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f64,
}

fn default_rrf_k() -> f64 {
    DEFAULT_RRF_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
        }
    }
}

/// Model selection for synthesis and the utility calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// First model tried by the fallback chain
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Models tried in order after the primary fails
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    /// Cheaper model used for query expansion and reranking
    #[serde(default = "default_utility_model")]
    pub utility_model: String,
}

fn default_primary_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_fallback_models() -> Vec<String> {
    vec![
        "gemini-2.5-flash".to_string(),
        "gemini-2.0-flash".to_string(),
    ]
}

fn default_utility_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary_model: default_primary_model(),
            fallback_models: default_fallback_models(),
            utility_model: default_utility_model(),
        }
    }
}

impl GenerationConfig {
    /// The ordered candidate list for the fallback chain
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates = vec![self.primary_model.clone()];
        for model in &self.fallback_models {
            if !candidates.contains(model) {
                candidates.push(model.clone());
            }
        }
        candidates
    }
}

/// Prompt-assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Leading block describing the corpus and the assistant's role
    #[serde(default = "default_domain_context")]
    pub domain_context: String,
}

fn default_domain_context() -> String {
    "You are a research assistant. Answer strictly from the supplied material.".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            domain_context: default_domain_context(),
        }
    }
}

/// Storage conventions for building browsable document URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the original documents; no URL fallback when unset
    #[serde(default)]
    pub bucket: Option<String>,
    /// Object prefix under the bucket
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
}

fn default_storage_prefix() -> String {
    "documents/".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: default_storage_prefix(),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl PipelineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.generation.primary_model.trim().is_empty() {
            return Err(Error::config("generation.primary_model must not be empty"));
        }
        if self.generation.utility_model.trim().is_empty() {
            return Err(Error::config("generation.utility_model must not be empty"));
        }
        if self.budget.total_tokens <= self.budget.reserved_overhead {
            return Err(Error::config(
                "budget.total_tokens must exceed budget.reserved_overhead",
            ));
        }
        if !(0.0..=1.0).contains(&self.budget.summary_share) {
            return Err(Error::config("budget.summary_share must be within 0..=1"));
        }
        if self.retrieval.rrf_k <= 0.0 {
            return Err(Error::config("retrieval.rrf_k must be positive"));
        }
        Ok(())
    }
}
