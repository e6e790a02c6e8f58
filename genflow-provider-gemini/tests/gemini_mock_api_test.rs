//! Gemini mock API tests
//!
//! Verify the `generateContent` body, the API key header, and reply/error
//! mapping against a local mock server.

use genflow_core::context::FlowContext;
use genflow_core::error::GenflowError;
use genflow_core::response::extract_text;
use genflow_core::types::{
    FinishReason, GenerateRequest, GenerationConfig, Message, encode,
};
use genflow_provider_gemini::{Gemini, GeminiConfig};
use genflow_registry::ModelRegistry;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-1.5-flash";
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

fn registry_for(server: &MockServer) -> ModelRegistry {
    let config = GeminiConfig::new("test-key").with_base_url(server.uri());
    let gemini = Gemini::new(config).unwrap();
    let mut registry = ModelRegistry::new();
    gemini.define_model(&mut registry, MODEL).unwrap();
    registry
}

#[tokio::test]
async fn test_generate_content_request_shape() {
    let server = MockServer::start().await;
    let image = encode(JPEG, "image/jpeg").unwrap();

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You write horror."}]},
            "generationConfig": {"temperature": 1.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "The pumpkins whispered."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest {
        messages: vec![
            Message::system("You write horror.").build(),
            Message::user("Pumpkins").with_media(image.clone()).build(),
        ],
        config: GenerationConfig::new().with_temperature(1.0),
        ..Default::default()
    };
    let response = registry_for(&server)
        .resolve(MODEL)
        .unwrap()
        .generate(&FlowContext::new(), request)
        .await
        .unwrap();

    assert_eq!(extract_text(&response).unwrap(), "The pumpkins whispered.");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.model.as_deref(), Some(MODEL));

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(
        body["contents"][0]["parts"][1]["inlineData"],
        json!({"mimeType": "image/jpeg", "data": image.data()})
    );
}

#[tokio::test]
async fn test_gemini_error_message_is_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let request = GenerateRequest {
        messages: vec![Message::user("hi").build()],
        ..Default::default()
    };
    let err = registry_for(&server)
        .resolve(MODEL)
        .unwrap()
        .invoke(request)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GenflowError::BackendError {
            provider: "gemini".into(),
            status: Some(400),
            message: "API key not valid.".into(),
        }
    );
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let request = GenerateRequest {
        messages: vec![Message::user("hi").build()],
        ..Default::default()
    };
    let err = registry_for(&server)
        .resolve(MODEL)
        .unwrap()
        .invoke(request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenflowError::BackendError { status: Some(503), .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_blocked_prompt_has_no_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let request = GenerateRequest {
        messages: vec![Message::user("something unsafe").build()],
        ..Default::default()
    };
    let err = registry_for(&server)
        .resolve(MODEL)
        .unwrap()
        .invoke(request)
        .await
        .unwrap_err();
    assert_eq!(err, GenflowError::backend("gemini", "prompt blocked: SAFETY"));
}
