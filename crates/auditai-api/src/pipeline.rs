//! End-to-end analysis of one submission.

use auditai_ai::{build_audit_prompt, GenerationConfig, LLMProviderFactory, ModelInvoker};
use auditai_core::{
    missing_sections, package, AnalysisRequest, AnalysisResult, AuditConfig, Network, Result,
};
use auditai_explorer::{ExplorerClient, Resolver};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Resolver, prompt builder, model invoker and packager, run in sequence.
#[derive(Clone)]
pub struct AnalysisPipeline {
    resolver: Resolver,
    invoker: ModelInvoker,
}

impl AnalysisPipeline {
    pub fn new(resolver: Resolver, invoker: ModelInvoker) -> Self {
        Self { resolver, invoker }
    }

    /// Build the explorer client and model provider described by `config`.
    pub fn from_config(config: &AuditConfig) -> anyhow::Result<Self> {
        let fetcher = ExplorerClient::from_config(&config.explorer)?;
        let provider = LLMProviderFactory::create_from_config(&config.llm)?;
        let invoker =
            ModelInvoker::new(provider).with_generation_config(GenerationConfig::from(&config.llm));

        Ok(Self::new(Resolver::new(Arc::new(fetcher)), invoker))
    }

    pub fn invoker(&self) -> &ModelInvoker {
        &self.invoker
    }

    /// Analyze free-form input. An absent or unknown network name means ethereum.
    pub async fn analyze(&self, input: &str, network: Option<&str>) -> Result<AnalysisResult> {
        let network = network
            .map(Network::from_name_lenient)
            .unwrap_or_default();
        let request = AnalysisRequest::new(input, network)?;
        self.run(&request).await
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", %request_id, network = %request.network());

        self.execute(request).instrument(span).await
    }

    async fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let resolved = self.resolver.resolve_request(request).await?;
        info!(
            is_address = resolved.is_address,
            source_len = resolved.source_text.len(),
            "Source resolved"
        );

        let prompt = build_audit_prompt(&resolved.source_text);
        let report_text = self.invoker.invoke(&prompt).await?;

        let missing = missing_sections(&report_text);
        if !missing.is_empty() {
            warn!(?missing, "Report is missing expected sections");
        }

        let result = package(report_text, &resolved, request.network());
        info!(security_score = ?result.security_score, "Analysis complete");
        Ok(result)
    }
}
