use crate::envelope::EnvelopeText;
use crate::llm_provider::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Configuration for OpenAI-compatible providers (OpenAI, LM Studio, vLLM, etc.)
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// Base URL for the API (e.g., "http://localhost:1234/v1")
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Optional API key (some local servers don't need one)
    pub api_key: Option<SecretString>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Provider name reported in logs and health output
    pub provider_name: String,
}

impl OpenAICompatibleConfig {
    /// Hosted OpenAI API
    pub fn openai(api_key: SecretString, model: Option<String>) -> Self {
        Self {
            base_url: OPENAI_API_BASE.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            api_key: Some(api_key),
            timeout_secs: 120,
            provider_name: "openai".to_string(),
        }
    }

    /// Any server exposing `/chat/completions`
    pub fn custom(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            api_key: None,
            timeout_secs: 120,
            provider_name: "openai-compatible".to_string(),
        }
    }
}

/// Provider speaking the OpenAI Chat Completions protocol
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn placeholder_response(&self, text: EnvelopeText) -> LLMResponse {
        LLMResponse {
            content: text.into_report_text(),
            prompt_tokens: None,
            completion_tokens: None,
            finish_reason: None,
            model: self.config.model.clone(),
        }
    }

    async fn send_request(&self, prompt: &str, config: &GenerationConfig) -> Result<Value> {
        let request = ChatCompletionsRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut request_builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(api_key) = &self.config.api_key {
            request_builder = request_builder.header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            );
        }

        let response = request_builder.send().await.context(format!(
            "Failed to send request to {} Chat Completions API at {}",
            self.config.provider_name, self.config.base_url
        ))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ProviderHttpError {
                provider: self.config.provider_name.clone(),
                status: status.as_u16(),
                body: error_text,
            }
            .into());
        }

        response.json::<Value>().await.context(format!(
            "Failed to parse {} Chat Completions API response",
            self.config.provider_name
        ))
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let body = self.send_request(prompt, config).await?;

        let completion = match serde_json::from_value::<ChatCompletionsResponse>(body) {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(
                    provider = %self.config.provider_name,
                    error = %e,
                    "Unexpected Chat Completions response structure"
                );
                return Ok(self.placeholder_response(EnvelopeText::Unrecognized));
            }
        };

        let model = completion
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let prompt_tokens = completion.usage.as_ref().map(|u| u.prompt_tokens);
        let completion_tokens = completion.usage.as_ref().map(|u| u.completion_tokens);

        let Some(choice) = completion.choices.into_iter().next() else {
            tracing::warn!(provider = %self.config.provider_name, "No choices in response");
            return Ok(self.placeholder_response(EnvelopeText::Missing));
        };

        let text = match choice.message.content {
            Some(content) if !content.is_empty() => EnvelopeText::Text(content),
            _ => EnvelopeText::Missing,
        };

        Ok(LLMResponse {
            content: text.into_report_text(),
            prompt_tokens,
            completion_tokens,
            finish_reason: choice.finish_reason,
            model,
        })
    }

    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Chat Completions API request/response types

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}
