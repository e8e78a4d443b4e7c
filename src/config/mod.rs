mod types;

pub use types::*;

use crate::{Error, Result, ocr::VisionCredentials, pipeline::PromptTemplate};
use std::env;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration: optional YAML file, then environment overrides,
/// then referenced files, then validation. Any failure here is fatal.
pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => Config::from_yaml_str(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit_path.is_none() => {
            debug!("No {} found, using defaults and environment", config_path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.apply_env_overrides(|key| env::var(key).ok())?;
    config.resolve_files().await?;
    config.validate()?;

    Ok(config)
}

impl Config {
    pub fn from_yaml_str(config_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(config_str)?)
    }

    /// Applies environment overrides on top of the file values. `lookup` is
    /// injected so tests don't have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("Invalid PORT value: '{}'", port)))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.server.logs.level = level;
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = limit.parse().map_err(|_| {
                Error::config(format!("Invalid MAX_UPLOAD_BYTES value: '{}'", limit))
            })?;
        }

        if let Some(json) = first(&[
            "GOOGLE_VISION_CREDENTIALS_JSON",
            "GOOGLE_APPLICATION_CREDENTIALS_JSON",
        ]) {
            self.ocr.credentials_json = Some(json);
        }
        if let Some(path) = lookup("GOOGLE_VISION_CREDENTIALS_PATH") {
            self.ocr.credentials_path = Some(path);
        }

        if let Some(api_key) = first(&["GEMINI_API_KEY", "LLM_API_KEY"]) {
            self.llm.api_key = api_key;
        }
        if let Some(base_url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = lookup("PROMPT_TEMPLATE_PATH") {
            self.llm.prompt_template_path = Some(path);
        }

        Ok(())
    }

    /// Reads file-backed values (credentials bundle, prompt template) into
    /// their inline counterparts. Inline values win over paths.
    pub async fn resolve_files(&mut self) -> Result<()> {
        if self.ocr.credentials_json.is_none() {
            if let Some(path) = &self.ocr.credentials_path {
                let json = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::config(format!("Cannot read OCR credentials at {}: {}", path, e))
                })?;
                self.ocr.credentials_json = Some(json);
            }
        }

        if self.llm.prompt_template.is_none() {
            if let Some(path) = &self.llm.prompt_template_path {
                let template = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::config(format!("Cannot read prompt template at {}: {}", path, e))
                })?;
                self.llm.prompt_template = Some(template);
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be non-zero"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::config("server.max_upload_bytes must be non-zero"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::config(
                "LLM API key is missing (set GEMINI_API_KEY or llm.api_key)",
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }

        self.ocr.credentials()?;
        self.llm.template()?;

        Ok(())
    }
}

impl OcrConfig {
    pub fn credentials(&self) -> Result<VisionCredentials> {
        let json = self.credentials_json.as_deref().ok_or_else(|| {
            Error::config(
                "OCR credentials are missing (set GOOGLE_VISION_CREDENTIALS_JSON or ocr.credentials_path)",
            )
        })?;
        VisionCredentials::from_json(json)
    }
}

impl LlmConfig {
    pub fn template(&self) -> Result<PromptTemplate> {
        match &self.prompt_template {
            Some(template) => PromptTemplate::new(template.clone()),
            None => Ok(PromptTemplate::default()),
        }
    }
}
