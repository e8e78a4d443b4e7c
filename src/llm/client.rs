use crate::{Error, Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Free-text generation from a single prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client. Works against any OpenAI-compatible endpoint,
/// including Gemini's.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.trim_end_matches('/'));
        }

        // The whole call is bounded by `timeout` in `generate`, so the HTTP
        // client only limits connection setup.
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder().connect_timeout(timeout).build()?;

        // No retries: a rate-limit or server error is returned on first sight.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Creating chat completion with {} model, prompt of {} chars",
            self.model,
            prompt.len()
        );

        let message = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(openai_types::ChatCompletionRequestUserMessageContent::Text(
                prompt.to_string(),
            ))
            .build()
            .map_err(|e| Error::llm(format!("Failed to build user message: {}", e)))?;

        let messages: Vec<openai_types::ChatCompletionRequestMessage> = vec![message.into()];

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);

        if let Some(temperature) = self.temperature {
            request_builder.temperature(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            #[allow(deprecated)]
            request_builder.max_tokens(max_tokens);
        }

        let openai_request = request_builder.build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(openai_request))
            .await
            .map_err(|_| Error::Timeout {
                service: "LLM",
                seconds: self.timeout.as_secs(),
            })??;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm("Model returned no choices"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
