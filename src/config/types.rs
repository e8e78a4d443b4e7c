use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub feature: VisionFeature,
    /// Inline credentials bundle (JSON).
    #[serde(default)]
    pub credentials_json: Option<String>,
    /// Path to a credentials bundle; read at startup when no inline bundle is set.
    #[serde(default)]
    pub credentials_path: Option<String>,
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
}

/// Vision API detection mode. `DOCUMENT_TEXT_DETECTION` is tuned for dense text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisionFeature {
    #[default]
    TextDetection,
    DocumentTextDetection,
}

impl VisionFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextDetection => "TEXT_DETECTION",
            Self::DocumentTextDetection => "DOCUMENT_TEXT_DETECTION",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Must contain the `{EXTRACTED_TEXT}` placeholder exactly once.
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub prompt_template_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ocr_endpoint(),
            feature: VisionFeature::default(),
            credentials_json: None,
            credentials_path: None,
            timeout_secs: default_ocr_timeout_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_llm_timeout_secs(),
            prompt_template: None,
            prompt_template_path: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_ocr_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_ocr_timeout_secs() -> u64 {
    30
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}
