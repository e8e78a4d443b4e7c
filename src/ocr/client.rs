use super::token::ServiceAccountTokenSource;
use super::types::*;
use crate::{Error, Result, config::OcrConfig, config::VisionFeature, pipeline::UploadedImage};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Turns an image into plain text. Returns an empty string when the image
/// contains no recognizable text; service failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &UploadedImage) -> Result<String>;
}

enum Authorizer {
    ApiKey(String),
    Bearer(String),
    ServiceAccount(ServiceAccountTokenSource),
}

pub struct GoogleVisionClient {
    client: reqwest::Client,
    url: String,
    auth: Authorizer,
    project_id: Option<String>,
    feature: VisionFeature,
    timeout_secs: u64,
}

impl GoogleVisionClient {
    pub fn new(config: &OcrConfig, credentials: VisionCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // A minted token is already bound to the service account's project.
        let (auth, project_id) = match credentials.auth()? {
            VisionAuth::ApiKey(key) => (Authorizer::ApiKey(key), credentials.project_id),
            VisionAuth::Bearer(token) => (Authorizer::Bearer(token), credentials.project_id),
            VisionAuth::ServiceAccount(key) => (
                Authorizer::ServiceAccount(ServiceAccountTokenSource::new(client.clone(), key)?),
                None,
            ),
        };

        Ok(Self {
            client,
            url: format!("{}/v1/images:annotate", config.endpoint.trim_end_matches('/')),
            auth,
            project_id,
            feature: config.feature,
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                service: "OCR",
                seconds: self.timeout_secs,
            }
        } else {
            Error::Network(e)
        }
    }
}

#[async_trait]
impl TextExtractor for GoogleVisionClient {
    async fn extract_text(&self, image: &UploadedImage) -> Result<String> {
        debug!(
            "Sending {} byte image to Vision API ({})",
            image.len(),
            self.feature.as_str()
        );

        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: image.base64(),
                },
                features: vec![Feature {
                    feature_type: self.feature.as_str().to_string(),
                }],
            }],
        };

        let mut request = self.client.post(&self.url).json(&body);
        request = match &self.auth {
            Authorizer::ApiKey(key) => request.query(&[("key", key)]),
            Authorizer::Bearer(token) => request.bearer_auth(token),
            Authorizer::ServiceAccount(source) => {
                let token = source
                    .access_token()
                    .await
                    .map_err(|e| match e {
                        Error::Network(e) => self.map_send_error(e),
                        other => other,
                    })?;
                request.bearer_auth(token)
            }
        };
        if let Some(project_id) = &self.project_id {
            request = request.header("x-goog-user-project", project_id);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(Error::ocr(format!(
                "Vision API returned {}: {}",
                status,
                if message.is_empty() {
                    "no error details"
                } else {
                    message.as_str()
                }
            )));
        }

        let annotated: AnnotateResponse =
            response.json().await.map_err(|e| self.map_send_error(e))?;

        let Some(first) = annotated.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(error) = first.error {
            return Err(Error::ocr(format!(
                "Vision API could not process image (code {}): {}",
                error.code, error.message
            )));
        }

        let text = first
            .full_text_annotation
            .map(|annotation| annotation.text)
            .unwrap_or_default();

        debug!("Vision API returned {} characters", text.len());

        Ok(text)
    }
}
