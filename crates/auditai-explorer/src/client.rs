use async_trait::async_trait;
use auditai_core::{AuditError, ConfigError, ExplorerConfig, ExplorerEndpoints, Network, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const NOT_FOUND: &str = "Contract source code not found or not verified";

/// Verified source as listed by a block explorer, before envelope unwrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSource {
    pub source_code: String,
    pub contract_name: Option<String>,
}

/// Lookup of verified contract source for an address.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_source(&self, address: &str, network: Network) -> Result<ContractSource>;
}

/// Etherscan-family explorer client (etherscan, bscscan, polygonscan, snowtrace).
pub struct ExplorerClient {
    client: Client,
    endpoints: ExplorerEndpoints,
    api_key: SecretString,
}

impl ExplorerClient {
    pub fn new(endpoints: ExplorerEndpoints, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::UpstreamFetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoints,
            api_key,
        })
    }

    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AuditError::Config(ConfigError::ValidationError(
                "Block explorer API key is not configured".to_string(),
            ))
        })?;
        Self::new(
            config.endpoints.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint_for(&self, network: Network) -> &str {
        self.endpoints.endpoint_for(network)
    }
}

#[async_trait]
impl SourceFetcher for ExplorerClient {
    async fn fetch_source(&self, address: &str, network: Network) -> Result<ContractSource> {
        let endpoint = self.endpoint_for(network);
        info!(address, %network, "Fetching contract source from explorer");

        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
                ("apikey", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| {
                AuditError::UpstreamFetch(format!("Explorer request to {} failed: {}", endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::UpstreamFetch(format!(
                "Explorer returned HTTP {}",
                status
            )));
        }

        let body: ExplorerResponse = response.json().await.map_err(|e| {
            AuditError::UpstreamFetch(format!("Invalid explorer JSON response: {}", e))
        })?;

        parse_source_response(body)
    }
}

/// `getsourcecode` response body.
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    pub status: Value,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

impl ExplorerResponse {
    fn is_success(&self) -> bool {
        match &self.status {
            Value::String(s) => s == "1",
            Value::Number(n) => n.as_u64() == Some(1),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    #[serde(rename = "SourceCode", default)]
    source_code: String,
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

/// Extract the first listed source from an explorer response.
pub fn parse_source_response(body: ExplorerResponse) -> Result<ContractSource> {
    if !body.is_success() {
        // On failure `result` usually carries a human-readable reason
        let reason = body.result.as_str().unwrap_or(body.message.as_str());
        debug!(status = %body.status, reason, "Explorer reported failure");
        return Err(AuditError::UpstreamFetch(format!("{} ({})", NOT_FOUND, reason)));
    }

    let entries: Vec<SourceEntry> = serde_json::from_value(body.result)
        .map_err(|_| AuditError::UpstreamFetch(NOT_FOUND.to_string()))?;

    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| AuditError::UpstreamFetch(NOT_FOUND.to_string()))?;

    if entry.source_code.is_empty() {
        return Err(AuditError::UpstreamFetch(NOT_FOUND.to_string()));
    }

    Ok(ContractSource {
        source_code: entry.source_code,
        contract_name: (!entry.contract_name.is_empty()).then_some(entry.contract_name),
    })
}
