use crate::{Error, Result};
use jsonwebtoken::EncodingKey;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Credentials bundle for the Vision API. `api_key` wins over `access_token`,
/// which wins over a service-account key (`client_email` + `private_key`).
#[derive(Clone, Deserialize)]
pub struct VisionCredentials {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, rename = "type")]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionAuth {
    ApiKey(String),
    Bearer(String),
    ServiceAccount(ServiceAccountKey),
}

/// Service-account identity used to mint short-lived access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            Error::config(format!(
                "Invalid service-account private_key for {}: {}",
                self.client_email, e
            ))
        })
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl VisionCredentials {
    pub fn from_json(json: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Malformed OCR credentials JSON: {}", e)))?;
        if let VisionAuth::ServiceAccount(key) = credentials.auth()? {
            key.encoding_key()?;
        }
        Ok(credentials)
    }

    pub fn auth(&self) -> Result<VisionAuth> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(key) = non_empty(&self.api_key) {
            return Ok(VisionAuth::ApiKey(key));
        }
        if let Some(token) = non_empty(&self.access_token) {
            return Ok(VisionAuth::Bearer(token));
        }

        match (non_empty(&self.client_email), non_empty(&self.private_key)) {
            (Some(client_email), Some(private_key)) => {
                Ok(VisionAuth::ServiceAccount(ServiceAccountKey {
                    client_email,
                    // Keys pasted into env vars often carry escaped newlines.
                    private_key: private_key.replace("\\n", "\n"),
                    token_uri: non_empty(&self.token_uri)
                        .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
                }))
            }
            _ if self.credential_type.as_deref() == Some("service_account") => Err(Error::config(
                "Service-account credentials must contain client_email and private_key",
            )),
            _ => Err(Error::config(
                "OCR credentials must contain an api_key, an access_token or a service-account key",
            )),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for VisionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Body of a non-2xx Google API response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiStatus,
}
