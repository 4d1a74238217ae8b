//! Generative model provider trait and error classification

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token usage reported by a model call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Successful model output
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Token accounting for the call
    pub usage: TokenUsage,
}

/// Closed classification of model-call failures
///
/// Rate/quota failures advance the fallback chain silently; anything else is
/// logged before advancing. Classification happens once, at the provider
/// boundary, never by substring checks downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelErrorKind {
    RateLimited,
    QuotaExceeded,
    Other,
}

/// A failed model call with its classification
#[derive(Debug, Clone, Error)]
#[error("model call failed ({kind:?}): {message}")]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ModelErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self {
            kind: ModelErrorKind::QuotaExceeded,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: ModelErrorKind::Other,
            message: message.into(),
        }
    }

    /// Whether the fallback chain should advance without logging a warning
    pub fn is_quiet(&self) -> bool {
        matches!(
            self.kind,
            ModelErrorKind::RateLimited | ModelErrorKind::QuotaExceeded
        )
    }
}

/// Classify a provider failure from HTTP status and response body
pub fn classify_failure(status: Option<u16>, message: &str) -> ModelErrorKind {
    if status == Some(429) {
        return ModelErrorKind::RateLimited;
    }
    let lower = message.to_lowercase();
    if lower.contains("quota")
        || lower.contains("resource_exhausted")
        || lower.contains("insufficient")
    {
        return ModelErrorKind::QuotaExceeded;
    }
    if lower.contains("rate limit") || lower.contains("too many requests") {
        return ModelErrorKind::RateLimited;
    }
    ModelErrorKind::Other
}

/// Trait for generative model services
///
/// One provider instance can serve multiple model identifiers; the candidate
/// model is named per call so the fallback chain can walk a model list over a
/// single connection.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate text for a prompt with the given sampling parameters
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> std::result::Result<Generation, ModelError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_429_is_rate_limited() {
        assert_eq!(
            classify_failure(Some(429), "anything"),
            ModelErrorKind::RateLimited
        );
    }

    #[test]
    fn test_classify_quota_body() {
        assert_eq!(
            classify_failure(Some(403), "Quota exceeded for model"),
            ModelErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_failure(Some(500), "RESOURCE_EXHAUSTED"),
            ModelErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_failure(None, "insufficient capacity"),
            ModelErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn test_classify_rate_limit_body_without_status() {
        assert_eq!(
            classify_failure(None, "Rate limit reached, slow down"),
            ModelErrorKind::RateLimited
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify_failure(Some(500), "internal server error"),
            ModelErrorKind::Other
        );
    }

    #[test]
    fn test_quiet_advancement() {
        assert!(ModelError::rate_limited("x").is_quiet());
        assert!(ModelError::quota("x").is_quiet());
        assert!(!ModelError::other("x").is_quiet());
    }
}
