//! Vertex AI Gemini client implementing the generative model provider
//!
//! Talks to the per-model `generateContent` endpoint and maps provider
//! failures onto the closed error classification used by the fallback chain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::llm::{classify_failure, Generation, GenerativeModel, ModelError, TokenUsage};

/// Vertex AI client
///
/// The bearer token is supplied by the caller (service-account exchange is a
/// deployment concern); one client serves every candidate model in the
/// fallback chain.
pub struct VertexModel {
    client: Client,
    project_id: String,
    location: String,
    access_token: String,
}

impl VertexModel {
    /// Create a new Vertex client
    ///
    /// # Arguments
    /// * `project_id` - GCP project id
    /// * `location` - GCP region (e.g. "us-central1")
    /// * `access_token` - OAuth bearer token for the Vertex API
    pub fn new(project_id: String, location: String, access_token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            project_id,
            location,
            access_token,
        }
    }

    /// Per-model API endpoint URL
    fn endpoint(&self, model: &str) -> String {
        format!(
            "https://{}-aiplatform.googleapis.com/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.location, self.project_id, self.location, model
        )
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(serde::Deserialize, Default)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u32,
}

#[async_trait]
impl GenerativeModel for VertexModel {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> std::result::Result<Generation, ModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
                top_p: 0.85,
            },
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::other(format!("Vertex request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let kind = classify_failure(Some(status), &body);
            return Err(ModelError {
                kind,
                message: format!("Vertex generation failed ({}): {}", status, body),
            });
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::other(format!("Failed to parse Vertex response: {}", e)))?;

        let usage = gen_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        gen_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| Generation {
                text: p.text,
                usage,
            })
            .ok_or_else(|| ModelError::other("No text in Vertex response"))
    }

    fn name(&self) -> &str {
        "vertex"
    }
}
