use crate::pipeline::AnalysisPipeline;
use auditai_core::AuditConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_config(config: &AuditConfig) -> anyhow::Result<Self> {
        Ok(Self::new(AnalysisPipeline::from_config(config)?))
    }
}
