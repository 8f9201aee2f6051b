use crate::envelope::NO_RESPONSE;
use crate::llm_provider::{GenerationConfig, LLMProvider, ProviderHttpError};
use auditai_core::{AuditError, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Sends a prompt to the configured model and returns the report text.
#[derive(Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Single attempt. Transport, status and decode failures become
    /// `AuditError::Model`; an empty answer becomes the no-response text.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let response = self
            .provider
            .generate_with_config(prompt, &self.generation)
            .await
            .map_err(|e| {
                let status = e
                    .chain()
                    .find_map(|cause| cause.downcast_ref::<ProviderHttpError>())
                    .map(|http| http.status);
                error!(
                    provider = self.provider.provider_name(),
                    ?status,
                    "Model call failed: {:#}",
                    e
                );
                AuditError::Model {
                    status,
                    message: format!("{:#}", e),
                }
            })?;

        info!(
            provider = self.provider.provider_name(),
            model = %response.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_tokens = ?response.prompt_tokens,
            completion_tokens = ?response.completion_tokens,
            "Model response received"
        );

        if response.content.trim().is_empty() {
            return Ok(NO_RESPONSE.to_string());
        }
        Ok(response.content)
    }
}
