use crate::envelope::{EnvelopeText, ModelEnvelope};
use crate::llm_provider::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the Google Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Generative Language API
    pub api_key: SecretString,
    /// Model to use (e.g., "gemini-2.0-flash")
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Google Gemini LLM provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.expose_secret().is_empty() {
            return Err(anyhow!(
                "Gemini API key is required. Set GEMINI_API_KEY environment variable."
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send a single request to the Gemini API
    async fn send_request(&self, prompt: &str, config: &GenerationConfig) -> Result<Value> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: (config.temperature.is_some() || config.max_tokens.is_some())
                .then(|| GeminiGenerationConfig {
                    temperature: config.temperature,
                    max_output_tokens: config.max_tokens,
                }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ProviderHttpError {
                provider: "gemini".to_string(),
                status: status.as_u16(),
                body: error_text,
            }
            .into());
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse Gemini API response")
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let start = Instant::now();
        let body = self.send_request(prompt, config).await?;

        let prompt_tokens = usage_count(&body, "promptTokenCount");
        let completion_tokens = usage_count(&body, "candidatesTokenCount");
        let model = body
            .get("modelVersion")
            .and_then(Value::as_str)
            .unwrap_or(self.config.model.as_str())
            .to_string();

        let envelope = ModelEnvelope::from_value(body);
        let shape = envelope.shape();
        let finish_reason = envelope.finish_reason().map(str::to_string);
        let text = envelope.into_text();
        if text == EnvelopeText::Unrecognized {
            tracing::warn!("Unexpected Gemini response structure");
        }

        tracing::debug!(
            shape,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ?finish_reason,
            "Gemini response received"
        );

        Ok(LLMResponse {
            content: text.into_report_text(),
            prompt_tokens,
            completion_tokens,
            finish_reason,
            model,
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn usage_count(body: &Value, field: &str) -> Option<usize> {
    body.get("usageMetadata")?
        .get(field)?
        .as_u64()
        .map(|n| n as usize)
}

// Gemini API request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation_requires_api_key() {
        let config = GeminiConfig::new(SecretString::from(String::new()));
        assert!(GeminiProvider::new(config).is_err());
    }

    #[test]
    fn test_endpoint_uses_model_and_base_url() {
        let mut config = GeminiConfig::new(SecretString::from("key".to_string()));
        config.base_url = "http://localhost:9999/v1beta/".to_string();
        let provider = GeminiProvider::new(config).unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_generation_config_serialization() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(0.5),
                max_output_tokens: None,
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }
}
