// ==============================================================================
// openai_adapter_test.rs - OpenAI Responses Adapter Tests
// ==============================================================================
// Description: Exercises the HTTP adapter against a local mock server
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use genegenie_report::config::GeneratorConfig;
use genegenie_report::llm::{
    GenerationError, GenerationRequest, OpenAiResponsesGenerator, TextGenerator,
};
use httpmock::prelude::*;
use std::time::Duration;

fn config(server: &MockServer, max_retries: u32) -> GeneratorConfig {
    GeneratorConfig {
        api_key: Some("sk-test".to_string()),
        base_url: server.base_url(),
        model: "gpt-5-mini".to_string(),
        request_timeout_secs: 1,
        max_retries,
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system_context: "You are \"GeneGenie\".\n### Sleep & Rhythm\nrs1801260 (CLOCK 3111T/C): TT".to_string(),
        user_instructions: "Write the sleep section.".to_string(),
        output_budget: 700,
        label: "Sleep, Caffeine & Rhythm".to_string(),
    }
}

#[tokio::test]
async fn test_posts_responses_request_and_reads_output_text() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/responses")
            .header("authorization", "Bearer sk-test")
            .json_body_partial(
                r#"{ "model": "gpt-5-mini", "input": "Write the sleep section.", "max_output_tokens": 700 }"#,
            );
        then.status(200).json_body(serde_json::json!({
            "id": "resp_1",
            "output_text": "  ## Sleep, Caffeine & Rhythm\n\nYou are a natural early riser.  "
        }));
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 0)).unwrap();
    let text = generator.generate(&request()).await.unwrap();

    assert_eq!(text, "## Sleep, Caffeine & Rhythm\n\nYou are a natural early riser.");
    assert_eq!(generator.name(), "openai");
    mock.assert();
}

#[tokio::test]
async fn test_reads_nested_output_content() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/responses");
        then.status(200).json_body(serde_json::json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "Part one." },
                    { "type": "output_text", "text": { "value": "Part two." } }
                ]}
            ]
        }));
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 0)).unwrap();
    let text = generator.generate(&request()).await.unwrap();

    assert_eq!(text, "Part one.\nPart two.");
    mock.assert();
}

#[tokio::test]
async fn test_empty_output_is_normalized() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/responses");
        then.status(200).json_body(serde_json::json!({ "output_text": "   ", "output": [] }));
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 2)).unwrap();
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err, GenerationError::EmptyOutput);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/responses");
        then.status(400).json_body(serde_json::json!({
            "error": { "message": "Unsupported parameter", "type": "invalid_request_error" }
        }));
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 3)).unwrap();
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::Api {
            status: 400,
            message: "Unsupported parameter".to_string()
        }
    );
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_server_error_is_retried_then_surfaced() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/responses");
        then.status(503).body("upstream unavailable");
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 1)).unwrap();
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::Api {
            status: 503,
            message: "upstream unavailable".to_string()
        }
    );
    assert_eq!(err.kind(), "server_error");
    mock.assert_hits(2);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/responses");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(serde_json::json!({ "output_text": "too late" }));
    });

    let generator = OpenAiResponsesGenerator::new(&config(&server, 0)).unwrap();
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err, GenerationError::Timeout);
}
