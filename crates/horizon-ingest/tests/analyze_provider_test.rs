//! HTTP-level tests for the OpenAI-compatible analysis backend.
//!
//! Verifies the bounded-output contract: whatever the provider returns,
//! the analysis that comes out is fully clamped and defaulted, and failure
//! causes stay distinguishable.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use horizon_core::{defaults, AnalysisBackend, Certainty, Error, Horizon};
use horizon_ingest::OpenAiAnalysisBackend;

fn backend_for(server: &MockServer) -> OpenAiAnalysisBackend {
    OpenAiAnalysisBackend::with_config(
        server.uri(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    )
}

fn completion_with(content: serde_json::Value) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content.to_string() } }
        ]
    })
}

fn long_content() -> String {
    "Analysts expect grid-scale storage deployments to triple within five years. ".repeat(5)
}

#[tokio::test]
async fn test_analyze_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(json!({
            "summary": "Grid-scale storage is accelerating.",
            "takeaways": ["Deployment tripling", "Costs falling", "Policy tailwinds"],
            "tags": ["Energy Storage", "grid"],
            "relevance": 85,
            "horizon": "0_5",
            "certainty": "certain"
        }))))
        .mount(&server)
        .await;

    let analysis = backend_for(&server)
        .analyze(&long_content(), Some("Storage"), None)
        .await
        .unwrap();

    assert_eq!(analysis.relevance, 85);
    assert_eq!(analysis.horizon, Horizon::ZeroToFive);
    assert_eq!(analysis.certainty, Certainty::Certain);
    assert_eq!(analysis.takeaways.len(), 3);
    assert_eq!(analysis.tags, vec!["energy-storage", "grid"]);
}

#[tokio::test]
async fn test_analyze_partial_payload_gets_deterministic_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(json!({
            "summary": "Only a summary came back. It has two sentences."
        }))))
        .mount(&server)
        .await;

    let analysis = backend_for(&server)
        .analyze(&long_content(), None, None)
        .await
        .unwrap();

    assert_eq!(analysis.relevance, defaults::RELEVANCE_DEFAULT);
    assert_eq!(analysis.horizon, Horizon::FiveToTen);
    assert_eq!(analysis.certainty, Certainty::Uncertain);
    assert_eq!(analysis.takeaways.len(), 3);
    assert!(analysis.tags.len() >= defaults::TAG_MIN);
}

#[tokio::test]
async fn test_analyze_rejects_short_content_without_any_request() {
    let server = MockServer::start().await;
    // Expect zero requests: the length gate fires first.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .analyze("way too short", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ContentTooShort(_)));
}

#[tokio::test]
async fn test_analyze_insufficient_content_signal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(json!({
            "insufficient_content": true
        }))))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .analyze(&long_content(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoContent(_)));
}

#[tokio::test]
async fn test_analyze_non_json_output_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Sorry, I cannot help." } }
            ]
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .analyze(&long_content(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_analyze_quota_and_rate_limit_are_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"error":{"type":"insufficient_quota"}}"#),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .analyze(&long_content(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QuotaExhausted(_)));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .analyze(&long_content(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited(_)));
}

#[tokio::test]
async fn test_analyze_without_api_key_names_the_connector() {
    let backend = OpenAiAnalysisBackend::with_config(
        "http://127.0.0.1:9".to_string(),
        None,
        "test-model".to_string(),
    );
    let err = backend.analyze(&long_content(), None, None).await.unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("OPENAI_API_KEY")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_describe_truncates_to_1800_chars() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "d".repeat(4000) } }
            ]
        })))
        .mount(&server)
        .await;

    let description = backend_for(&server)
        .describe("Decentralized energy", &[])
        .await
        .unwrap();
    assert_eq!(description.chars().count(), defaults::TREND_DESCRIPTION_MAX);
}

#[tokio::test]
async fn test_describe_rejects_empty_title() {
    let backend = OpenAiAnalysisBackend::with_config(
        "http://127.0.0.1:9".to_string(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    );
    let err = backend.describe("  ", &[]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
