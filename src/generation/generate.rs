//! Answer generation through an ordered model fallback chain

use std::sync::Arc;
use std::time::Instant;

use crate::providers::{Generation, GenerativeModel, ModelError, TokenUsage};
use crate::tracking::{GenerationAttempt, UsageTracker};

use super::format::FormatDecision;

/// Sentinel model name reported when every candidate failed
pub const FALLBACK_MODEL_SENTINEL: &str = "fallback-none";

/// Result of running the fallback chain
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    /// Answer text (canned fallback when no model succeeded)
    pub text: String,
    /// Model that produced the text, or the fallback sentinel
    pub model_used: String,
    /// Token usage of the successful call, if any
    pub usage: Option<TokenUsage>,
}

/// Outcome of one chain step, decided from a single model call
#[derive(Debug)]
enum ChainStep {
    Done(Generation),
    Advance(ModelError),
}

/// Invokes candidate models in order until one succeeds
///
/// The candidate list is an immutable configuration value constructed once
/// and passed in; the chain never retries the same model, only advances.
/// Every attempt is recorded to the tracker regardless of outcome.
pub struct AnswerGenerator {
    model: Arc<dyn GenerativeModel>,
    candidates: Vec<String>,
    tracker: Arc<UsageTracker>,
}

impl AnswerGenerator {
    /// Create a generator over an ordered candidate list
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        candidates: Vec<String>,
        tracker: Arc<UsageTracker>,
    ) -> Self {
        Self {
            model,
            candidates,
            tracker,
        }
    }

    /// Run the fallback chain for an assembled prompt
    ///
    /// Rate/quota failures advance silently; other failures are logged before
    /// advancing. Exhaustion yields the canned fallback answer, never an
    /// error.
    pub async fn generate(
        &self,
        prompt: &str,
        decision: &FormatDecision,
        summaries_available: usize,
        excerpts_available: usize,
    ) -> GeneratedAnswer {
        for candidate in &self.candidates {
            match self.attempt(candidate, prompt, decision).await {
                ChainStep::Done(generation) => {
                    tracing::info!(
                        "Answer generated by '{}' ({} tokens)",
                        candidate,
                        generation.usage.total_tokens
                    );
                    return GeneratedAnswer {
                        text: generation.text,
                        model_used: candidate.clone(),
                        usage: Some(generation.usage),
                    };
                }
                ChainStep::Advance(error) => {
                    if error.is_quiet() {
                        tracing::debug!(
                            "Candidate '{}' unavailable ({:?}), advancing",
                            candidate,
                            error.kind
                        );
                    } else {
                        tracing::warn!("Candidate '{}' failed: {}", candidate, error);
                    }
                }
            }
        }

        tracing::warn!("All {} candidate models failed", self.candidates.len());
        GeneratedAnswer {
            text: fallback_answer(summaries_available, excerpts_available),
            model_used: FALLBACK_MODEL_SENTINEL.to_string(),
            usage: None,
        }
    }

    /// One call to one candidate, recorded to the tracker either way
    async fn attempt(&self, candidate: &str, prompt: &str, decision: &FormatDecision) -> ChainStep {
        let start = Instant::now();
        let result = self
            .model
            .generate(
                candidate,
                prompt,
                decision.temperature,
                decision.max_output_tokens,
            )
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(generation) => {
                self.tracker.record(GenerationAttempt::success(
                    candidate,
                    generation.usage,
                    latency_ms,
                ));
                ChainStep::Done(generation)
            }
            Err(error) => {
                self.tracker.record(GenerationAttempt::failure(
                    candidate,
                    error.to_string(),
                    latency_ms,
                ));
                ChainStep::Advance(error)
            }
        }
    }
}

/// Deterministic canned answer for total generation exhaustion
pub fn fallback_answer(summaries_available: usize, excerpts_available: usize) -> String {
    format!(
        "No generative model was available to synthesize an answer. \
{} document summaries and {} excerpts relevant to the question were retrieved; \
please retry shortly.",
        summaries_available, excerpts_available
    )
}
