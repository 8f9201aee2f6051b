use crate::gemini_provider::{GeminiConfig, GeminiProvider};
use crate::llm_provider::*;
use crate::openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
use anyhow::{anyhow, Context, Result};
use auditai_core::LLMConfig;
use secrecy::SecretString;
use std::sync::Arc;

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    pub fn create_from_config(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider_name = config.provider.to_lowercase();

        match provider_name.as_str() {
            "gemini" => Self::create_gemini_provider(config),
            "openai" => Self::create_openai_provider(config),
            "openai-compatible" => Self::create_openai_compatible_provider(config),
            _ => Err(anyhow!(
                "Unsupported LLM provider: {}. Available providers: {}",
                provider_name,
                Self::supported_providers().join(", ")
            )),
        }
    }

    fn create_gemini_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let api_key = Self::require_api_key(config, "GEMINI_API_KEY")?;

        let mut gemini_config = GeminiConfig::new(api_key);
        if let Some(model) = &config.model {
            gemini_config.model = model.clone();
        }
        if let Some(base_url) = &config.base_url {
            gemini_config.base_url = base_url.clone();
        }
        gemini_config.timeout_secs = config.timeout_secs;

        Ok(Arc::new(GeminiProvider::new(gemini_config)?))
    }

    fn create_openai_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let api_key = Self::require_api_key(config, "OPENAI_API_KEY")?;

        let mut openai_config = OpenAICompatibleConfig::openai(api_key, config.model.clone());
        if let Some(base_url) = &config.base_url {
            openai_config.base_url = base_url.clone();
        }
        openai_config.timeout_secs = config.timeout_secs;

        Ok(Arc::new(OpenAICompatibleProvider::new(openai_config)?))
    }

    fn create_openai_compatible_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let base_url = config
            .base_url
            .clone()
            .context("base_url is required for the openai-compatible provider")?;
        let model = config
            .model
            .clone()
            .context("model is required for the openai-compatible provider")?;

        let mut compat_config = OpenAICompatibleConfig::custom(base_url, model);
        compat_config.api_key = config.api_key.clone();
        compat_config.timeout_secs = config.timeout_secs;

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    fn require_api_key(config: &LLMConfig, env_var: &str) -> Result<SecretString> {
        config.api_key.clone().ok_or_else(|| {
            anyhow!(
                "{} API key not found. Set {} environment variable or llm.api_key in config.",
                config.provider,
                env_var
            )
        })
    }

    /// Providers this build can construct
    pub fn supported_providers() -> Vec<&'static str> {
        vec!["gemini", "openai", "openai-compatible"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(provider: &str) -> LLMConfig {
        LLMConfig {
            provider: provider.to_string(),
            api_key: Some(SecretString::from("key".to_string())),
            ..LLMConfig::default()
        }
    }

    #[test]
    fn test_supported_providers() {
        let providers = LLMProviderFactory::supported_providers();
        assert!(providers.contains(&"gemini"));
        assert!(providers.contains(&"openai-compatible"));
    }

    #[test]
    fn test_gemini_defaults() {
        let provider = LLMProviderFactory::create_from_config(&llm_config("Gemini")).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_openai_model_override() {
        let mut config = llm_config("openai");
        config.model = Some("gpt-4o-mini".to_string());
        let provider = LLMProviderFactory::create_from_config(&config).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = llm_config("gemini");
        config.api_key = None;
        let err = LLMProviderFactory::create_from_config(&config)
            .err()
            .unwrap();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_openai_compatible_requires_base_url() {
        let mut config = llm_config("openai-compatible");
        config.model = Some("local".to_string());
        assert!(LLMProviderFactory::create_from_config(&config).is_err());

        config.base_url = Some("http://localhost:1234/v1".to_string());
        config.api_key = None;
        let provider = LLMProviderFactory::create_from_config(&config).unwrap();
        assert_eq!(provider.model_name(), "local");
    }

    #[test]
    fn test_unknown_provider() {
        let err = LLMProviderFactory::create_from_config(&llm_config("ollama"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unsupported LLM provider"));
    }
}
