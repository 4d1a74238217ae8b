//! Append-only usage tracking for generation attempts

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::providers::TokenUsage;

/// Outcome of one model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Error,
}

/// One call to one candidate model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    /// Record id
    pub id: Uuid,
    /// Candidate model name
    pub model: String,
    /// Prompt tokens consumed
    pub input_tokens: u32,
    /// Completion tokens produced
    pub output_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
    /// Call latency in milliseconds
    pub latency_ms: u64,
    /// Success or error
    pub status: AttemptStatus,
    /// Error detail for failed attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Record timestamp
    pub created_at: DateTime<Utc>,
}

impl GenerationAttempt {
    /// Record a successful call
    pub fn success(model: impl Into<String>, usage: TokenUsage, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
            latency_ms,
            status: AttemptStatus::Success,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Record a failed call
    pub fn failure(model: impl Into<String>, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            latency_ms,
            status: AttemptStatus::Error,
            error: Some(error.into()),
            created_at: Utc::now(),
        }
    }
}

/// Aggregated usage across all recorded attempts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageTotals {
    pub attempts: usize,
    pub successes: usize,
    pub failures: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Append-only, thread-safe sink for generation attempts
///
/// Created once at process start and passed by reference to every component
/// that emits usage records. Each append is atomic; concurrent writers never
/// interleave within a record. Recording never fails and never blocks the
/// pipeline beyond the lock.
#[derive(Default)]
pub struct UsageTracker {
    attempts: Mutex<Vec<GenerationAttempt>>,
}

impl UsageTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one attempt record
    pub fn record(&self, attempt: GenerationAttempt) {
        tracing::debug!(
            "Recorded attempt: model={} status={:?} tokens={} latency={}ms",
            attempt.model,
            attempt.status,
            attempt.total_tokens,
            attempt.latency_ms
        );
        self.attempts.lock().push(attempt);
    }

    /// Snapshot of all records so far, in append order
    pub fn snapshot(&self) -> Vec<GenerationAttempt> {
        self.attempts.lock().clone()
    }

    /// Number of recorded attempts
    pub fn len(&self) -> usize {
        self.attempts.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.attempts.lock().is_empty()
    }

    /// Roll up token usage and outcome counts
    pub fn totals(&self) -> UsageTotals {
        let attempts = self.attempts.lock();
        let mut totals = UsageTotals {
            attempts: attempts.len(),
            ..Default::default()
        };
        for attempt in attempts.iter() {
            match attempt.status {
                AttemptStatus::Success => totals.successes += 1,
                AttemptStatus::Error => totals.failures += 1,
            }
            totals.input_tokens += u64::from(attempt.input_tokens);
            totals.output_tokens += u64::from(attempt.output_tokens);
            totals.total_tokens += u64::from(attempt.total_tokens);
        }
        totals
    }
}
