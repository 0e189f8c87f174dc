// ==============================================================================
// llm/openai.rs - OpenAI Responses API Adapter
// ==============================================================================
// Description: Text generator backed by the OpenAI Responses endpoint
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// The response body is nested and varies between SDK versions. extract_text()
// is the only place that knows its shape.
// ==============================================================================

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{GenerationError, GenerationRequest, TextGenerator};
use crate::config::GeneratorConfig;

const MAX_BACKOFF: Duration = Duration::from_secs(8);
const BASE_BACKOFF: Duration = Duration::from_millis(500);

pub struct OpenAiResponsesGenerator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiResponsesGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenerationError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn generate_once(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: &request.system_context,
            input: &request.user_instructions,
            max_output_tokens: request.output_budget,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_body)
                .map(|e| e.error.message)
                .unwrap_or(error_body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::MalformedResponse(e.to_string())
            }
        })?;

        extract_text(&payload).ok_or(GenerationError::EmptyOutput)
    }

    fn backoff(attempt: u32) -> Duration {
        let base = BASE_BACKOFF
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF);
        // 25% jitter
        let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 4);
        base + Duration::from_millis(jitter_ms)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiResponsesGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(request).await {
                Ok(text) => {
                    debug!(label = %request.label, attempt = attempt + 1, "Generation succeeded");
                    return Ok(text);
                }
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = Self::backoff(attempt);
                    warn!(
                        label = %request.label,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %err,
                        "Generation call failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn map_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

/// Pull the generated text out of a Responses API body
///
/// Prefers the top-level `output_text`. Otherwise walks `output[].content[]`
/// collecting `text` strings or `text.value` objects. Returns `None` when no
/// non-blank text is present.
pub fn extract_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let chunks: Vec<&str> = body
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|content| match content.get("text") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_str),
            _ => None,
        })
        .collect();

    let joined = chunks.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
