pub mod envelope;
pub mod gemini_provider;
pub mod invoker;
pub mod llm_factory;
pub mod llm_provider;
pub mod openai_compatible_provider;
pub mod prompts;

pub use envelope::{EnvelopeText, ModelEnvelope, NO_RESPONSE, UNRECOGNIZED_RESPONSE};
pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use invoker::ModelInvoker;
pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
pub use prompts::build_audit_prompt;
