use crate::{ApiError, ApiResult, AppState};
use auditai_core::AnalysisResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    /// Contract address or literal source code
    #[serde(default, alias = "address")]
    pub input: String,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_provider: String,
    pub llm_model: String,
}

pub async fn analyze_contract(
    State(state): State<AppState>,
    payload: Result<Json<ContractRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let result = state
        .pipeline
        .analyze(&request.input, request.network.as_deref())
        .await?;

    Ok(Json(result))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let invoker = state.pipeline.invoker();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_provider: invoker.provider_name().to_string(),
        llm_model: invoker.model_name().to_string(),
    })
}
