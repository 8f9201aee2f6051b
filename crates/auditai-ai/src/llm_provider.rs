use async_trait::async_trait;
use auditai_core::LLMConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for LLM operations
pub type LLMResult<T> = anyhow::Result<T>;

/// Configuration for generation parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Temperature for sampling; provider default when unset
    pub temperature: Option<f32>,
    /// Maximum tokens to generate; provider default when unset
    pub max_tokens: Option<usize>,
}

impl From<&LLMConfig> for GenerationConfig {
    fn from(config: &LLMConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Response from the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Generated text content
    pub content: String,
    /// Tokens used in the prompt
    pub prompt_tokens: Option<usize>,
    /// Tokens generated in the completion
    pub completion_tokens: Option<usize>,
    /// Finish reason (e.g., "STOP", "stop", "length")
    pub finish_reason: Option<String>,
    /// Model used for generation
    pub model: String,
}

/// Non-success HTTP status returned by a provider API.
#[derive(Debug, Error)]
#[error("{provider} API error ({status}): {body}")]
pub struct ProviderHttpError {
    pub provider: String,
    pub status: u16,
    pub body: String,
}

/// Main trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> LLMResult<LLMResponse> {
        self.generate_with_config(prompt, &GenerationConfig::default())
            .await
    }

    /// Generate a completion with custom configuration. One request, no retries.
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse>;

    /// Get the name of this provider
    fn provider_name(&self) -> &str;

    /// Get the model identifier
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn generate_with_config(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> LLMResult<LLMResponse> {
            Ok(LLMResponse {
                content: format!("{}:{:?}", prompt, config.temperature),
                prompt_tokens: None,
                completion_tokens: None,
                finish_reason: None,
                model: "echo".to_string(),
            })
        }

        fn provider_name(&self) -> &str {
            "echo"
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_generate_uses_default_config() {
        let response = block_on(EchoProvider.generate("hello")).unwrap();
        assert_eq!(response.content, "hello:None");
    }

    #[test]
    fn test_generation_config_from_llm_config() {
        let llm = LLMConfig {
            temperature: Some(0.2),
            max_tokens: Some(2048),
            ..LLMConfig::default()
        };
        let generation = GenerationConfig::from(&llm);
        assert_eq!(generation.temperature, Some(0.2));
        assert_eq!(generation.max_tokens, Some(2048));
    }

    #[test]
    fn test_http_error_display() {
        let err = ProviderHttpError {
            provider: "gemini".to_string(),
            status: 403,
            body: "PERMISSION_DENIED".to_string(),
        };
        assert_eq!(err.to_string(), "gemini API error (403): PERMISSION_DENIED");
    }
}
