use super::mocks::{MockTextExtractor, MockTextGenerator};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, Response},
};
use invoice_scanner::{
    config::{Config, LlmConfig, OcrConfig},
    pipeline::{InvoicePipeline, PromptTemplate},
    server::{self, handlers::AppState},
};
use serde_json::Value;
use std::sync::Arc;

pub const BOUNDARY: &str = "invoice-scanner-test-boundary";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake invoice pixels";

/// Build the real router around mock collaborators
pub fn create_test_app(
    extractor: Arc<MockTextExtractor>,
    generator: Arc<MockTextGenerator>,
) -> Router {
    create_test_app_with_limit(extractor, generator, DEFAULT_MAX_UPLOAD_BYTES)
}

pub fn create_test_app_with_limit(
    extractor: Arc<MockTextExtractor>,
    generator: Arc<MockTextGenerator>,
    max_upload_bytes: usize,
) -> Router {
    let pipeline = InvoicePipeline::new(extractor, generator, PromptTemplate::default());
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    server::router(state, max_upload_bytes)
}

/// One part of a multipart/form-data body
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some("invoice.png"),
            content_type: Some("image/png"),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// A well-formed upload of `data` under the `invoiceImage` field
pub fn image_request(data: &[u8]) -> Request<Body> {
    multipart_request(&[Part::file("invoiceImage", data)])
}

pub async fn read_body(response: Response<Body>) -> (StatusCode, Vec<u8>) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let (status, bytes) = read_body(response).await;
    let json = serde_json::from_slice(&bytes).expect("response body should be JSON");
    (status, json)
}

/// Create a test configuration pointing both clients at `base_url`
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        server: Default::default(),
        ocr: OcrConfig {
            endpoint: base_url.to_string(),
            credentials_json: Some(SAMPLE_CREDENTIALS_JSON.to_string()),
            timeout_secs: 5,
            ..Default::default()
        },
        llm: LlmConfig {
            base_url: base_url.to_string(),
            api_key: "test-api-key".to_string(),
            model: "gemini-1.5-pro".to_string(),
            timeout_secs: 5,
            ..Default::default()
        },
    }
}

pub const SAMPLE_CREDENTIALS_JSON: &str =
    r#"{"api_key": "test-vision-key", "project_id": "invoice-scanner-test"}"#;

/// Throwaway RSA key; only ever signs assertions sent to mock token endpoints.
pub const SERVICE_ACCOUNT_KEY: &str = include_str!("../fixtures/service-account-key.pem");

/// A service-account bundle whose token exchange goes to `token_uri`
pub fn service_account_credentials_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "invoice-scanner-test",
        "private_key_id": "0123456789abcdef",
        "private_key": SERVICE_ACCOUNT_KEY,
        "client_email": "scanner@invoice-scanner-test.iam.gserviceaccount.com",
        "client_id": "123456789",
        "token_uri": token_uri,
    })
    .to_string()
}

/// A Vision API reply carrying `text` as the full-text annotation
pub fn vision_response(text: &str) -> Value {
    serde_json::json!({
        "responses": [{
            "textAnnotations": [{"locale": "en", "description": text}],
            "fullTextAnnotation": {"pages": [], "text": text}
        }]
    })
}

/// A chat-completions reply with a single assistant message
pub fn chat_completion_response(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gemini-1.5-pro",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}
