//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use ecotrack_core::ports::{GenerationConfig, GenerationRequest, PortError, TextGenerator};
use ecotrack_provider_gemini::GeminiClient;
use reqwest::Client;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url(Client::new(), "test-key", "gemini-2.0-flash", base_url)
        .expect("client construction should not fail")
}

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_owned(),
        config: GenerationConfig::default(),
    }
}

#[tokio::test]
async fn generate_returns_first_candidate_text() {
    let server = MockServer::start().await;

    let expected_body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": "Focus on recycling. Can I recycle pizza boxes?" }]
        }],
        "generationConfig": { "topK": 40, "maxOutputTokens": 1024 }
    });
    let reply = serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": [{ "text": "Only if they are clean." }] } },
            { "content": { "role": "model", "parts": [{ "text": "ignored" }] } }
        ]
    });

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(&reply))
        .expect(1)
        .mount(&server)
        .await;

    let text = test_client(&server.uri())
        .generate(&request("Focus on recycling. Can I recycle pizza boxes?"))
        .await
        .expect("should parse reply");

    assert_eq!(text, "Only if they are clean.");
}

#[tokio::test]
async fn generate_without_candidates_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let text = test_client(&server.uri())
        .generate(&request("hello"))
        .await
        .expect("empty reply is still a reply");

    assert!(text.is_empty());
}

#[tokio::test]
async fn generate_reports_error_status_as_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .generate(&request("hello"))
        .await
        .expect_err("429 should fail");

    assert!(matches!(err, PortError::Api(ref status) if status.contains("429")));
    assert!(!err.to_string().contains("test-key"));
}

#[tokio::test]
async fn generate_reports_malformed_json_as_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .generate(&request("hello"))
        .await
        .expect_err("html is not a reply");

    assert!(matches!(err, PortError::Decode(_)));
    assert!(!err.to_string().contains("test-key"));
}
