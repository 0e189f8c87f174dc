// ==============================================================================
// llm/mod.rs - Text Generation Collaborator Boundary
// ==============================================================================
// Description: Generator trait, request shape and normalized failure kinds
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Retry, timeout and rate-limit policy live entirely behind this trait. The
// orchestrator only sees `Ok(text)` or `Err(GenerationError)`.
// ==============================================================================

pub mod offline;
pub mod openai;

pub use offline::OfflineGenerator;
pub use openai::OpenAiResponsesGenerator;

use thiserror::Error;

/// One bounded generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Persona, tier description and grounding data
    pub system_context: String,
    /// Task for this call
    pub user_instructions: String,
    /// Maximum output tokens
    pub output_budget: u32,
    /// Short label for logs (section heading or tier name)
    pub label: String,
}

/// Normalized failure of a generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation timed out")]
    Timeout,

    #[error("Generator returned no text")]
    EmptyOutput,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Short machine-readable kind for logs and audit details
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Timeout => "timeout",
            GenerationError::EmptyOutput => "empty_output",
            GenerationError::Transport(_) => "transport",
            GenerationError::Api { status: 429, .. } => "rate_limit",
            GenerationError::Api { status, .. } if *status >= 500 => "server_error",
            GenerationError::Api { .. } => "api_error",
            GenerationError::MalformedResponse(_) => "malformed_response",
            GenerationError::NotConfigured(_) => "not_configured",
        }
    }

    /// Whether another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout | GenerationError::Transport(_) => true,
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// External text generation collaborator
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let cases = vec![
            (GenerationError::Timeout, "timeout", true),
            (GenerationError::EmptyOutput, "empty_output", false),
            (GenerationError::Transport("reset".into()), "transport", true),
            (GenerationError::Api { status: 429, message: "slow down".into() }, "rate_limit", true),
            (GenerationError::Api { status: 503, message: "busy".into() }, "server_error", true),
            (GenerationError::Api { status: 400, message: "bad".into() }, "api_error", false),
            (GenerationError::MalformedResponse("x".into()), "malformed_response", false),
            (GenerationError::NotConfigured("key".into()), "not_configured", false),
        ];

        for (err, kind, retryable) in cases {
            assert_eq!(err.kind(), kind, "{:?}", err);
            assert_eq!(err.is_retryable(), retryable, "{:?}", err);
        }
    }

    #[test]
    fn test_error_display() {
        let err = GenerationError::Api { status: 401, message: "invalid key".into() };
        assert_eq!(err.to_string(), "API error (401): invalid key");
    }
}
